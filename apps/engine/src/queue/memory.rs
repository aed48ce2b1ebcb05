//! In-memory task queue. Backs standalone mode and the test suite.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::queue::{Task, TaskPayload, TaskQueue, TaskStatus, TaskStatusView};

#[derive(Default)]
struct QueueInner {
    tasks: HashMap<Uuid, Task>,
    /// FIFO of ids still believed pending; entries are re-checked against
    /// the task's actual status on claim.
    pending: VecDeque<Uuid>,
}

#[derive(Default)]
pub struct InMemoryTaskQueue {
    inner: Mutex<QueueInner>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, payload: TaskPayload) -> Result<Uuid, EngineError> {
        let task = Task::new(payload);
        let id = task.id;
        let mut inner = self.inner.lock().await;
        inner.tasks.insert(id, task);
        inner.pending.push_back(id);
        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<Task>, EngineError> {
        // The lock makes the pop-plus-transition atomic: at most one caller
        // can win the Pending→Running transition for a given task.
        let mut inner = self.inner.lock().await;
        while let Some(id) = inner.pending.pop_front() {
            if let Some(task) = inner.tasks.get_mut(&id) {
                if task.status == TaskStatus::Pending {
                    task.status = TaskStatus::Running;
                    task.updated_at = Utc::now();
                    return Ok(Some(task.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn complete(&self, id: Uuid, result: Value) -> Result<(), EngineError> {
        self.finish(id, TaskStatus::Completed, result).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), EngineError> {
        self.finish(id, TaskStatus::Failed, json!({ "error": error }))
            .await
    }

    async fn get_status(&self, id: Uuid) -> Result<Option<TaskStatusView>, EngineError> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.get(&id).map(|task| TaskStatusView {
            id: task.id,
            task_type: task.task_type,
            status: task.status,
            result: task.result.clone(),
        }))
    }
}

impl InMemoryTaskQueue {
    async fn finish(
        &self,
        id: Uuid,
        status: TaskStatus,
        result: Value,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().await;
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Task {id} not found")))?;

        if task.status.is_terminal() {
            warn!(
                "Ignoring {} transition for task {id} already {}",
                status.as_str(),
                task.status.as_str()
            );
            return Ok(());
        }

        task.status = status;
        task.result = Some(result);
        task.updated_at = Utc::now();
        Ok(())
    }
}
