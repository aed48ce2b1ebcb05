//! In-memory repositories. Used as test doubles and as the standalone-mode
//! backend when `DATABASE_URL` is unset.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::{Application, CandidateProfile, JobPosting};
use crate::store::{ApplicationRepo, CandidateRepo, JobRepo};

#[derive(Default)]
pub struct InMemoryCandidateRepo {
    records: RwLock<HashMap<Uuid, CandidateProfile>>,
}

#[async_trait]
impl CandidateRepo for InMemoryCandidateRepo {
    async fn get(&self, id: Uuid) -> Result<Option<CandidateProfile>, EngineError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert(&self, candidate: CandidateProfile) -> Result<(), EngineError> {
        self.records.write().await.insert(candidate.id, candidate);
        Ok(())
    }

    async fn apply_cv_results(
        &self,
        id: Uuid,
        parsed_text: &str,
        skills: &BTreeSet<String>,
    ) -> Result<(), EngineError> {
        // Union happens under the write guard, so two completions for the
        // same candidate cannot lose each other's skills.
        let mut records = self.records.write().await;
        let candidate = records
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Candidate {id} not found")))?;
        candidate.parsed_text = Some(parsed_text.to_string());
        candidate.skills.extend(skills.iter().cloned());
        candidate.updated_at = Utc::now();
        Ok(())
    }
}

/// Jobs keep insertion order so `list()` returns creation order.
#[derive(Default)]
pub struct InMemoryJobRepo {
    records: RwLock<Vec<JobPosting>>,
}

#[async_trait]
impl JobRepo for InMemoryJobRepo {
    async fn get(&self, id: Uuid) -> Result<Option<JobPosting>, EngineError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|job| job.id == id)
            .cloned())
    }

    async fn insert(&self, job: JobPosting) -> Result<(), EngineError> {
        self.records.write().await.push(job);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<JobPosting>, EngineError> {
        Ok(self.records.read().await.clone())
    }
}

#[derive(Default)]
pub struct InMemoryApplicationRepo {
    records: RwLock<HashMap<Uuid, Application>>,
}

#[async_trait]
impl ApplicationRepo for InMemoryApplicationRepo {
    async fn get(&self, id: Uuid) -> Result<Option<Application>, EngineError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert(&self, application: Application) -> Result<(), EngineError> {
        self.records
            .write()
            .await
            .insert(application.id, application);
        Ok(())
    }

    async fn set_cover_letter(&self, id: Uuid, letter: &str) -> Result<(), EngineError> {
        let mut records = self.records.write().await;
        let application = records
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Application {id} not found")))?;
        application.cover_letter = Some(letter.to_string());
        application.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_apply_cv_results_unions_skills() {
        let repo = InMemoryCandidateRepo::default();
        let mut candidate = CandidateProfile::new("Ada Lovelace", "ada@example.com");
        candidate.skills = skills(&["python"]);
        let id = candidate.id;
        repo.insert(candidate).await.unwrap();

        repo.apply_cv_results(id, "cv text", &skills(&["rust", "python"]))
            .await
            .unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.skills, skills(&["python", "rust"]));
        assert_eq!(stored.parsed_text.as_deref(), Some("cv text"));
    }

    #[tokio::test]
    async fn test_apply_cv_results_is_idempotent() {
        let repo = InMemoryCandidateRepo::default();
        let candidate = CandidateProfile::new("Ada Lovelace", "ada@example.com");
        let id = candidate.id;
        repo.insert(candidate).await.unwrap();

        let extracted = skills(&["rust", "docker"]);
        repo.apply_cv_results(id, "cv text", &extracted).await.unwrap();
        let after_once = repo.get(id).await.unwrap().unwrap().skills;

        repo.apply_cv_results(id, "cv text", &extracted).await.unwrap();
        let after_twice = repo.get(id).await.unwrap().unwrap().skills;

        assert_eq!(after_once, after_twice);
    }

    #[tokio::test]
    async fn test_apply_cv_results_missing_candidate_is_not_found() {
        let repo = InMemoryCandidateRepo::default();
        let result = repo
            .apply_cv_results(Uuid::new_v4(), "text", &skills(&["rust"]))
            .await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_job_list_preserves_insertion_order() {
        let repo = InMemoryJobRepo::default();
        repo.insert(JobPosting::new("First")).await.unwrap();
        repo.insert(JobPosting::new("Second")).await.unwrap();

        let jobs = repo.list().await.unwrap();
        assert_eq!(jobs[0].title, "First");
        assert_eq!(jobs[1].title, "Second");
    }

    #[tokio::test]
    async fn test_set_cover_letter_overwrites_previous() {
        let repo = InMemoryApplicationRepo::default();
        let application = Application::new(Uuid::new_v4(), Uuid::new_v4());
        let id = application.id;
        repo.insert(application).await.unwrap();

        repo.set_cover_letter(id, "first draft").await.unwrap();
        repo.set_cover_letter(id, "second draft").await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.cover_letter.as_deref(), Some("second draft"));
    }
}
