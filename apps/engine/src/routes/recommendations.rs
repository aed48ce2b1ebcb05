use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::matching::{rank_jobs, RankedJob};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub candidate_id: Uuid,
    pub recommendations: Vec<RankedJob>,
}

/// GET /api/v1/candidates/:id/recommendations
///
/// Synchronous, recomputed on every call (match results are ephemeral).
/// Uses the tag-overlap scorer — job tags are the authority for this list;
/// the prose scorer is reserved for the background MATCH task.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecommendationsResponse>, EngineError> {
    let candidate = state
        .candidates
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Candidate {id} not found")))?;

    let jobs = state.jobs.list().await?;
    let recommendations = rank_jobs(&candidate.skills, &jobs);

    Ok(Json(RecommendationsResponse {
        candidate_id: id,
        recommendations,
    }))
}
