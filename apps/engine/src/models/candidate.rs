use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate's profile record.
///
/// `parsed_text` is populated asynchronously once CV ingestion completes.
/// `skills` is the candidate's SkillSet: lower-cased, duplicate-free by
/// construction (`BTreeSet`), mutated only via `CandidateRepo::apply_cv_results`
/// set-union or explicit user edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub parsed_text: Option<String>,
    pub skills: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateProfile {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            parsed_text: None,
            skills: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Comma-joined skill list for display and letter interpolation.
    pub fn skill_list(&self) -> String {
        self.skills.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
