//! Task Queue — durable, named queues of pending units of work.
//!
//! Every task moves through `Pending -> Running -> {Completed | Failed}`;
//! the terminal states are frozen. The claim is the single arbitration
//! point: whichever worker wins the Pending→Running transition owns the
//! task. Delivery is at-least-once, so everything downstream of a claim is
//! idempotent (see `store::CandidateRepo::apply_cv_results`).
//!
//! Payloads are a tagged union dispatched by exhaustive match in `worker`;
//! the queue itself never interprets them. Payload ids are weak references
//! re-validated at execution time.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CvParse,
    Match,
    CoverLetter,
}

impl TaskType {
    /// The queue name a task of this type lands on.
    pub fn queue_name(self) -> &'static str {
        match self {
            TaskType::CvParse => "cv_parse",
            TaskType::Match => "match",
            TaskType::CoverLetter => "cover_letter",
        }
    }
}

/// Typed task payloads, tagged by task type. The worker dispatches with an
/// exhaustive match — no field-presence probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskPayload {
    CvParse {
        candidate_id: Uuid,
        /// Raw CV text extracted by the (out-of-scope) upload layer; the
        /// heuristic fallback runs over this.
        cv_text: Option<String>,
        /// Location handed to the external analysis service when configured.
        cv_url: Option<String>,
    },
    Match {
        candidate_id: Uuid,
        job_id: Uuid,
    },
    CoverLetter {
        candidate_id: Uuid,
        job_id: Uuid,
        application_id: Uuid,
    },
}

impl TaskPayload {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskPayload::CvParse { .. } => TaskType::CvParse,
            TaskPayload::Match { .. } => TaskType::Match,
            TaskPayload::CoverLetter { .. } => TaskType::CoverLetter,
        }
    }
}

/// One unit of asynchronous work tracked through the status state machine.
/// `status` is the single source of truth for whether the work finished and
/// with what outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub task_type: TaskType,
    pub payload: TaskPayload,
    pub status: TaskStatus,
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(payload: TaskPayload) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_type: payload.task_type(),
            payload,
            status: TaskStatus::Pending,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// What status polling exposes to callers: no partial or ambiguous states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusView {
    pub id: Uuid,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub result: Option<Value>,
}

/// The queue capability injected into the worker pool and the HTTP driver.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Creates a task in `Pending` and returns its id.
    async fn enqueue(&self, payload: TaskPayload) -> Result<Uuid, EngineError>;

    /// Claims the oldest `Pending` task, transitioning it to `Running`.
    /// At most one claimer wins a given task; returns `None` when every
    /// queue is empty.
    async fn claim_next(&self) -> Result<Option<Task>, EngineError>;

    /// Marks a `Running` task `Completed` with the processor output.
    /// A task already in a terminal state is left untouched.
    async fn complete(&self, id: Uuid, result: Value) -> Result<(), EngineError>;

    /// Marks a `Running` task `Failed` with `{"error": message}`.
    /// A task already in a terminal state is left untouched.
    async fn fail(&self, id: Uuid, error: &str) -> Result<(), EngineError>;

    async fn get_status(&self, id: Uuid) -> Result<Option<TaskStatusView>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trips_with_type_tag() {
        let payload = TaskPayload::Match {
            candidate_id: Uuid::nil(),
            job_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "match");

        let back: TaskPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.task_type(), TaskType::Match);
    }

    #[test]
    fn test_new_task_starts_pending_with_matching_type() {
        let task = Task::new(TaskPayload::CvParse {
            candidate_id: Uuid::nil(),
            cv_text: None,
            cv_url: None,
        });
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.task_type, TaskType::CvParse);
        assert!(task.result.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn test_queue_names() {
        assert_eq!(TaskType::CvParse.queue_name(), "cv_parse");
        assert_eq!(TaskType::CoverLetter.queue_name(), "cover_letter");
    }
}
