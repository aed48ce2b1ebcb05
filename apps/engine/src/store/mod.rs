//! Repositories — the engine consumes persistence as keyed-record stores.
//!
//! Each capability is a trait injected into the worker pool and the HTTP
//! driver (no global database handle), so tests run against the `memory`
//! doubles and production wires the `postgres` implementations over the
//! shared sqlx pool.

pub mod memory;
pub mod postgres;

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::{Application, CandidateProfile, JobPosting};

#[async_trait]
pub trait CandidateRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>, EngineError>;

    async fn insert(&self, candidate: CandidateProfile) -> Result<(), EngineError>;

    /// Applies a CV ingestion result as one atomic update: overwrites
    /// `parsed_text` and UNION-merges `skills` into the existing set.
    /// Idempotent under at-least-once task delivery — re-applying the same
    /// result leaves the record unchanged. Returns `NotFound` when the
    /// candidate no longer exists (stale task payload).
    async fn apply_cv_results(
        &self,
        id: Uuid,
        parsed_text: &str,
        skills: &BTreeSet<String>,
    ) -> Result<(), EngineError>;
}

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<JobPosting>, EngineError>;

    async fn insert(&self, job: JobPosting) -> Result<(), EngineError>;

    /// All postings in creation order — the stable tiebreak for ranking.
    async fn list(&self) -> Result<Vec<JobPosting>, EngineError>;
}

#[async_trait]
pub trait ApplicationRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Application>, EngineError>;

    async fn insert(&self, application: Application) -> Result<(), EngineError>;

    /// Overwrites the application's cover letter (regeneration reuses this).
    /// Returns `NotFound` when the application no longer exists.
    async fn set_cover_letter(&self, id: Uuid, letter: &str) -> Result<(), EngineError>;
}
