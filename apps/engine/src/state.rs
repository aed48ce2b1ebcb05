use std::sync::Arc;

use crate::queue::TaskQueue;
use crate::store::{ApplicationRepo, CandidateRepo, JobRepo};

/// Shared application state injected into all route handlers via Axum
/// extractors. Every capability is a trait object so the driver works
/// identically over the in-memory and PostgreSQL backends.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn TaskQueue>,
    pub candidates: Arc<dyn CandidateRepo>,
    pub jobs: Arc<dyn JobRepo>,
    pub applications: Arc<dyn ApplicationRepo>,
}
