//! Worker Pool — pulls tasks off the queue, dispatches by type, applies the
//! completion side effects, and records the terminal status.
//!
//! Each worker is a tokio task looping claim → execute → complete/fail. The
//! queue's claim is the only ownership arbitration; the pool never assumes
//! exactly-once delivery, so every database-facing effect here is idempotent
//! (skill merge is a set union, text writes are last-writer-wins).
//!
//! Completion side effects run synchronously inside the same unit of work,
//! immediately after the processor returns and before the status flips to
//! COMPLETED. The pure scoring/extraction/composition functions in
//! `matching` never see the repositories.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::CvAnalyzer;
use crate::errors::EngineError;
use crate::matching::{compose, extract, normalize, score_by_prose, MatchResult};
use crate::models::{CandidateProfile, JobPosting};
use crate::queue::{Task, TaskPayload, TaskQueue};
use crate::store::{ApplicationRepo, CandidateRepo, JobRepo};

/// Where a CV_PARSE result came from, recorded in the task result for
/// transparency.
const SOURCE_ANALYSIS_SERVICE: &str = "analysis_service";
const SOURCE_HEURISTIC: &str = "heuristic";

pub struct WorkerPool {
    pub queue: Arc<dyn TaskQueue>,
    pub candidates: Arc<dyn CandidateRepo>,
    pub jobs: Arc<dyn JobRepo>,
    pub applications: Arc<dyn ApplicationRepo>,
    /// External CV analysis backend; `None` means heuristic-only.
    pub analyzer: Option<Arc<dyn CvAnalyzer>>,
    pub worker_count: usize,
    pub poll_interval: Duration,
}

impl WorkerPool {
    /// Spawns the polling workers. Workers run until the process exits;
    /// tasks run to completion or failure, never cancelled mid-flight.
    pub fn spawn(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        (0..self.worker_count)
            .map(|worker_id| {
                let pool = Arc::clone(self);
                tokio::spawn(async move {
                    info!("Worker {worker_id} started");
                    loop {
                        match pool.run_next().await {
                            Ok(true) => {} // claimed and finished one; poll again immediately
                            Ok(false) => tokio::time::sleep(pool.poll_interval).await,
                            Err(e) => {
                                error!("Worker {worker_id} queue error: {e}");
                                tokio::time::sleep(pool.poll_interval).await;
                            }
                        }
                    }
                })
            })
            .collect()
    }

    /// Claims and runs at most one task. Returns whether a task was claimed.
    /// Errors returned here are queue errors only; processor failures are
    /// absorbed into the task's FAILED status and never bubble up.
    pub async fn run_next(&self) -> Result<bool, EngineError> {
        let Some(task) = self.queue.claim_next().await? else {
            return Ok(false);
        };
        self.run_task(task).await;
        Ok(true)
    }

    async fn run_task(&self, task: Task) {
        let task_id = task.id;
        let queue_name = task.task_type.queue_name();

        match self.execute(&task.payload).await {
            Ok(result) => {
                info!("Task {task_id} ({queue_name}) completed");
                if let Err(e) = self.queue.complete(task_id, result).await {
                    error!("Failed to record completion of task {task_id}: {e}");
                }
            }
            Err(e) => {
                // Caught, logged, recorded as FAILED. No automatic retry
                // here; retry policy belongs to the queue infrastructure.
                warn!("Task {task_id} ({queue_name}) failed: {e}");
                if let Err(record_err) = self.queue.fail(task_id, &e.to_string()).await {
                    error!("Failed to record failure of task {task_id}: {record_err}");
                }
            }
        }
    }

    /// Exhaustive dispatch over the typed payload. Each arm fetches its
    /// records (payload ids are weak references, re-validated here), invokes
    /// the pure processor, and applies the type-specific fan-out write.
    async fn execute(&self, payload: &TaskPayload) -> Result<Value, EngineError> {
        match payload {
            TaskPayload::CvParse {
                candidate_id,
                cv_text,
                cv_url,
            } => {
                self.run_cv_parse(*candidate_id, cv_text.as_deref(), cv_url.as_deref())
                    .await
            }
            TaskPayload::Match {
                candidate_id,
                job_id,
            } => self.run_match(*candidate_id, *job_id).await,
            TaskPayload::CoverLetter {
                candidate_id,
                job_id,
                application_id,
            } => {
                self.run_cover_letter(*candidate_id, *job_id, *application_id)
                    .await
            }
        }
    }

    async fn run_cv_parse(
        &self,
        candidate_id: Uuid,
        cv_text: Option<&str>,
        cv_url: Option<&str>,
    ) -> Result<Value, EngineError> {
        let candidate = self.fetch_candidate(candidate_id).await?;

        let (parsed_text, skills, source) = match (&self.analyzer, cv_url) {
            (Some(analyzer), Some(url)) => {
                match analyzer.analyze(url, candidate_id).await {
                    Ok(analysis) => {
                        let skills: BTreeSet<String> = analysis
                            .extracted_skills
                            .iter()
                            .map(|s| normalize(s))
                            .filter(|s| !s.is_empty())
                            .collect();
                        (analysis.parsed_text, skills, SOURCE_ANALYSIS_SERVICE)
                    }
                    Err(e) => {
                        // Hard contract: an unusable analysis service is
                        // recovered locally, never surfaced as a task failure.
                        warn!(
                            "Analysis service failed for candidate {candidate_id}, \
                             falling back to heuristic extraction: {e}"
                        );
                        heuristic_parse(&candidate, cv_text)
                    }
                }
            }
            _ => heuristic_parse(&candidate, cv_text),
        };

        // Fan-out: one atomic update, skills merged with set semantics so
        // re-delivery of this task cannot create duplicates.
        self.candidates
            .apply_cv_results(candidate_id, &parsed_text, &skills)
            .await?;

        Ok(json!({
            "candidate_id": candidate_id,
            "source": source,
            "skills": skills,
            "parsed_chars": parsed_text.len(),
        }))
    }

    /// Background MATCH scores against requirement/description prose, so
    /// this is Algorithm B territory (tags may be absent or stale here; the
    /// tag-overlap ranking lives in `matching::rank`).
    async fn run_match(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Value, EngineError> {
        let candidate = self.fetch_candidate(candidate_id).await?;
        let job = self.fetch_job(job_id).await?;

        let score = score_by_prose(&candidate.skills, &job);
        let result = MatchResult {
            candidate_id,
            job_id,
            score: score.score,
            matching_skills: score.matching_skills,
        };

        // Ephemeral by design: the result lives only in the task record and
        // is recomputed on demand.
        serde_json::to_value(&result)
            .map_err(|e| EngineError::Processor(format!("result serialization: {e}")))
    }

    async fn run_cover_letter(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        application_id: Uuid,
    ) -> Result<Value, EngineError> {
        let candidate = self.fetch_candidate(candidate_id).await?;
        let job = self.fetch_job(job_id).await?;
        if self.applications.get(application_id).await?.is_none() {
            return Err(EngineError::NotFound(format!(
                "Application {application_id} not found"
            )));
        }

        let letter = compose(&candidate, &job);

        // Fan-out: overwrite-on-regenerate, idempotent under re-delivery.
        self.applications
            .set_cover_letter(application_id, &letter)
            .await?;

        Ok(json!({
            "application_id": application_id,
            "cover_letter": letter,
        }))
    }

    async fn fetch_candidate(&self, id: Uuid) -> Result<CandidateProfile, EngineError> {
        self.candidates
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Candidate {id} not found")))
    }

    async fn fetch_job(&self, id: Uuid) -> Result<JobPosting, EngineError> {
        self.jobs
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Job {id} not found")))
    }
}

/// Local heuristic CV parse: the parsed text is whatever raw text is
/// available (payload first, then any previously stored text), and skills
/// come from the vocabulary extractor.
fn heuristic_parse(
    candidate: &CandidateProfile,
    cv_text: Option<&str>,
) -> (String, BTreeSet<String>, &'static str) {
    let text = cv_text
        .map(str::to_string)
        .or_else(|| candidate.parsed_text.clone())
        .unwrap_or_default();
    let skills = extract(&text);
    (text, skills, SOURCE_HEURISTIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::analysis::{AnalysisError, CvAnalysis};
    use crate::models::Application;
    use crate::queue::memory::InMemoryTaskQueue;
    use crate::queue::TaskStatus;
    use crate::store::memory::{InMemoryApplicationRepo, InMemoryCandidateRepo, InMemoryJobRepo};

    struct StubAnalyzer;

    #[async_trait]
    impl CvAnalyzer for StubAnalyzer {
        async fn analyze(
            &self,
            _cv_url: &str,
            _candidate_id: Uuid,
        ) -> Result<CvAnalysis, AnalysisError> {
            Ok(CvAnalysis {
                parsed_text: "Service-parsed CV body".to_string(),
                extracted_skills: vec!["Rust".to_string(), "Kafka".to_string()],
            })
        }
    }

    /// Simulates an unreachable analysis service.
    struct FailingAnalyzer;

    #[async_trait]
    impl CvAnalyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _cv_url: &str,
            _candidate_id: Uuid,
        ) -> Result<CvAnalysis, AnalysisError> {
            Err(AnalysisError::Api {
                status: 0,
                message: "connection refused".to_string(),
            })
        }
    }

    struct Fixture {
        pool: Arc<WorkerPool>,
        queue: Arc<InMemoryTaskQueue>,
        candidates: Arc<InMemoryCandidateRepo>,
        jobs: Arc<InMemoryJobRepo>,
        applications: Arc<InMemoryApplicationRepo>,
    }

    fn fixture(analyzer: Option<Arc<dyn CvAnalyzer>>) -> Fixture {
        let queue = Arc::new(InMemoryTaskQueue::new());
        let candidates = Arc::new(InMemoryCandidateRepo::default());
        let jobs = Arc::new(InMemoryJobRepo::default());
        let applications = Arc::new(InMemoryApplicationRepo::default());
        let pool = Arc::new(WorkerPool {
            queue: queue.clone(),
            candidates: candidates.clone(),
            jobs: jobs.clone(),
            applications: applications.clone(),
            analyzer,
            worker_count: 1,
            poll_interval: Duration::from_millis(10),
        });
        Fixture {
            pool,
            queue,
            candidates,
            jobs,
            applications,
        }
    }

    async fn seeded_candidate(fx: &Fixture) -> Uuid {
        let candidate = CandidateProfile::new("Ada Lovelace", "ada@example.com");
        let id = candidate.id;
        fx.candidates.insert(candidate).await.unwrap();
        id
    }

    async fn seeded_job(fx: &Fixture, requirements: &str) -> Uuid {
        let mut job = JobPosting::new("Platform Engineer");
        job.requirements = requirements.to_string();
        let id = job.id;
        fx.jobs.insert(job).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_cv_parse_completes_with_heuristic_extraction() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CvParse {
                candidate_id,
                cv_text: Some("Experienced with Kubernetes and Docker".to_string()),
                cv_url: None,
            })
            .await
            .unwrap();

        assert!(fx.pool.run_next().await.unwrap());

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Completed);
        assert_eq!(view.result.as_ref().unwrap()["source"], "heuristic");

        let candidate = fx.candidates.get(candidate_id).await.unwrap().unwrap();
        assert!(candidate.skills.contains("kubernetes"));
        assert!(candidate.skills.contains("docker"));
        assert_eq!(
            candidate.parsed_text.as_deref(),
            Some("Experienced with Kubernetes and Docker")
        );
    }

    #[tokio::test]
    async fn test_cv_parse_redelivery_does_not_duplicate_skills() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;

        for _ in 0..2 {
            fx.queue
                .enqueue(TaskPayload::CvParse {
                    candidate_id,
                    cv_text: Some("Python and SQL background".to_string()),
                    cv_url: None,
                })
                .await
                .unwrap();
            fx.pool.run_next().await.unwrap();
        }

        let candidate = fx.candidates.get(candidate_id).await.unwrap().unwrap();
        assert_eq!(candidate.skills.len(), 2);
    }

    #[tokio::test]
    async fn test_cv_parse_uses_analysis_service_when_it_answers() {
        let fx = fixture(Some(Arc::new(StubAnalyzer)));
        let candidate_id = seeded_candidate(&fx).await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CvParse {
                candidate_id,
                cv_text: None,
                cv_url: Some("https://cdn.example.com/cv.pdf".to_string()),
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Completed);
        assert_eq!(view.result.as_ref().unwrap()["source"], "analysis_service");

        let candidate = fx.candidates.get(candidate_id).await.unwrap().unwrap();
        // Service skills are normalized on the way in.
        assert!(candidate.skills.contains("rust"));
        assert!(candidate.skills.contains("kafka"));
        assert_eq!(candidate.parsed_text.as_deref(), Some("Service-parsed CV body"));
    }

    #[tokio::test]
    async fn test_cv_parse_falls_back_when_analysis_service_fails() {
        let fx = fixture(Some(Arc::new(FailingAnalyzer)));
        let candidate_id = seeded_candidate(&fx).await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CvParse {
                candidate_id,
                cv_text: Some("Terraform and AWS daily".to_string()),
                cv_url: Some("https://cdn.example.com/cv.pdf".to_string()),
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        // The unreachable service must not fail the task.
        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Completed);
        assert_eq!(view.result.as_ref().unwrap()["source"], "heuristic");

        let candidate = fx.candidates.get(candidate_id).await.unwrap().unwrap();
        assert!(candidate.skills.contains("terraform"));
        assert!(candidate.skills.contains("aws"));
    }

    #[tokio::test]
    async fn test_cv_parse_stale_candidate_fails_with_captured_error() {
        let fx = fixture(None);

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CvParse {
                candidate_id: Uuid::new_v4(),
                cv_text: Some("anything".to_string()),
                cv_url: None,
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Failed);
        let error = view.result.unwrap()["error"].as_str().unwrap().to_string();
        assert!(error.contains("not found"), "error was: {error}");
    }

    #[tokio::test]
    async fn test_match_task_scores_against_prose_without_persisting() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;
        fx.candidates
            .apply_cv_results(
                candidate_id,
                "cv",
                &["kubernetes", "docker", "php", "scala"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
            .await
            .unwrap();
        let job_id = seeded_job(&fx, "Kubernetes and Docker in production").await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::Match {
                candidate_id,
                job_id,
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Completed);
        let result = view.result.unwrap();
        assert_eq!(result["score"], 50);

        // Ephemeral: the candidate record carries no match result.
        let candidate = fx.candidates.get(candidate_id).await.unwrap().unwrap();
        assert_eq!(candidate.parsed_text.as_deref(), Some("cv"));
    }

    #[tokio::test]
    async fn test_match_with_stale_job_fails() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::Match {
                candidate_id,
                job_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_cover_letter_task_writes_onto_application() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;
        let job_id = seeded_job(&fx, "").await;
        let application = Application::new(candidate_id, job_id);
        let application_id = application.id;
        fx.applications.insert(application).await.unwrap();

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CoverLetter {
                candidate_id,
                job_id,
                application_id,
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert_eq!(view.status, TaskStatus::Completed);

        let stored = fx.applications.get(application_id).await.unwrap().unwrap();
        let letter = stored.cover_letter.unwrap();
        assert!(letter.contains("Ada Lovelace"));
        assert!(letter.contains("Platform Engineer"));
    }

    #[tokio::test]
    async fn test_processed_task_reaches_exactly_one_terminal_state() {
        let fx = fixture(None);
        let candidate_id = seeded_candidate(&fx).await;

        let task_id = fx
            .queue
            .enqueue(TaskPayload::CvParse {
                candidate_id,
                cv_text: Some("plain text".to_string()),
                cv_url: None,
            })
            .await
            .unwrap();
        fx.pool.run_next().await.unwrap();

        let view = fx.queue.get_status(task_id).await.unwrap().unwrap();
        assert!(view.status.is_terminal());
        // Nothing left to claim; the finished task is never re-delivered.
        assert!(!fx.pool.run_next().await.unwrap());
    }

    #[tokio::test]
    async fn test_run_next_on_empty_queue_claims_nothing() {
        let fx = fixture(None);
        assert!(!fx.pool.run_next().await.unwrap());
    }
}
