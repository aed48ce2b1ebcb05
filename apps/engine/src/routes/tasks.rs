use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::queue::{TaskPayload, TaskStatusView};
use crate::state::AppState;

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub task_id: Uuid,
}

/// POST /api/v1/tasks
///
/// Body is the tagged task payload, e.g.
/// `{"type": "match", "candidate_id": "...", "job_id": "..."}`.
/// Execution is asynchronous; callers learn the outcome by polling status.
pub async fn handle_enqueue(
    State(state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<EnqueueResponse>, EngineError> {
    let task_id = state.queue.enqueue(payload).await?;
    Ok(Json(EnqueueResponse { task_id }))
}

/// GET /api/v1/tasks/:id
pub async fn handle_get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskStatusView>, EngineError> {
    let view = state
        .queue
        .get_status(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Task {id} not found")))?;
    Ok(Json(view))
}
