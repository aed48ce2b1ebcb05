use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An employer's job posting.
///
/// `tags` are the employer-curated keywords and are authoritative for
/// tag-overlap scoring; `description` and `requirements` are free prose and
/// feed the text-containment scorer. `created_at` order is the stable
/// tiebreak when ranking jobs for a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            company: None,
            description: String::new(),
            requirements: String::new(),
            location: String::new(),
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Company name for display, with a neutral placeholder when unknown.
    pub fn company_or_placeholder(&self) -> &str {
        self.company.as_deref().unwrap_or("Company")
    }
}
