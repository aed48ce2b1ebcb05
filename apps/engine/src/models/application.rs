use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate's application to a job posting.
///
/// `cover_letter` is written once by the composer on COVER_LETTER task
/// completion and overwritten on regeneration; it is never auto-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(candidate_id: Uuid, job_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            job_id,
            cover_letter: None,
            created_at: now,
            updated_at: now,
        }
    }
}
