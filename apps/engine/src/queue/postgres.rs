//! Durable PostgreSQL task queue.
//!
//! Claims use `FOR UPDATE SKIP LOCKED` so concurrent workers never race for
//! the same row; the claim statement is the Pending→Running transition.
//! Terminal updates are guarded with `status = 'running'`, which freezes
//! completed/failed tasks against double transitions.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY,
//!     task_type TEXT NOT NULL,
//!     payload JSONB NOT NULL,
//!     status TEXT NOT NULL DEFAULT 'pending',
//!     result JSONB,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL);
//! CREATE INDEX tasks_pending_idx ON tasks (created_at) WHERE status = 'pending';
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::warn;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::queue::{Task, TaskQueue, TaskPayload, TaskStatus, TaskStatusView};

pub struct PgTaskQueue {
    pool: PgPool,
}

impl PgTaskQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_from_str(s: &str) -> Result<TaskStatus, EngineError> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "running" => Ok(TaskStatus::Running),
        "completed" => Ok(TaskStatus::Completed),
        "failed" => Ok(TaskStatus::Failed),
        other => Err(EngineError::Internal(anyhow::anyhow!(
            "unknown task status in database: {other}"
        ))),
    }
}

fn task_from_row(row: PgRow) -> Result<Task, EngineError> {
    let status: String = row.try_get("status").map_err(EngineError::Database)?;
    let payload: Value = row.try_get("payload").map_err(EngineError::Database)?;
    let payload: TaskPayload = serde_json::from_value(payload)
        .map_err(|e| EngineError::Internal(anyhow::anyhow!("corrupt task payload: {e}")))?;

    Ok(Task {
        id: row.try_get("id").map_err(EngineError::Database)?,
        task_type: payload.task_type(),
        payload,
        status: status_from_str(&status)?,
        result: row.try_get("result").map_err(EngineError::Database)?,
        created_at: row.try_get("created_at").map_err(EngineError::Database)?,
        updated_at: row.try_get("updated_at").map_err(EngineError::Database)?,
    })
}

#[async_trait]
impl TaskQueue for PgTaskQueue {
    async fn enqueue(&self, payload: TaskPayload) -> Result<Uuid, EngineError> {
        let task = Task::new(payload);
        let payload_json = serde_json::to_value(&task.payload)
            .map_err(|e| EngineError::Internal(anyhow::anyhow!("payload serialization: {e}")))?;

        sqlx::query(
            "INSERT INTO tasks (id, task_type, payload, status, created_at, updated_at)
             VALUES ($1, $2, $3, 'pending', $4, $5)",
        )
        .bind(task.id)
        .bind(task.task_type.queue_name())
        .bind(payload_json)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(task.id)
    }

    async fn claim_next(&self) -> Result<Option<Task>, EngineError> {
        let row = sqlx::query(
            "UPDATE tasks SET status = 'running', updated_at = now()
             WHERE id = (
                 SELECT id FROM tasks
                 WHERE status = 'pending'
                 ORDER BY created_at
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING id, task_type, payload, status, result, created_at, updated_at",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(task_from_row).transpose()
    }

    async fn complete(&self, id: Uuid, result: Value) -> Result<(), EngineError> {
        self.finish(id, TaskStatus::Completed, result).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), EngineError> {
        self.finish(id, TaskStatus::Failed, json!({ "error": error }))
            .await
    }

    async fn get_status(&self, id: Uuid) -> Result<Option<TaskStatusView>, EngineError> {
        let row = sqlx::query("SELECT id, task_type, payload, status, result FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };

        let status: String = row.try_get("status").map_err(EngineError::Database)?;
        let payload: Value = row.try_get("payload").map_err(EngineError::Database)?;
        let payload: TaskPayload = serde_json::from_value(payload)
            .map_err(|e| EngineError::Internal(anyhow::anyhow!("corrupt task payload: {e}")))?;

        Ok(Some(TaskStatusView {
            id: row.try_get("id").map_err(EngineError::Database)?,
            task_type: payload.task_type(),
            status: status_from_str(&status)?,
            result: row.try_get("result").map_err(EngineError::Database)?,
        }))
    }
}

impl PgTaskQueue {
    async fn finish(
        &self,
        id: Uuid,
        status: TaskStatus,
        result: Value,
    ) -> Result<(), EngineError> {
        let outcome = sqlx::query(
            "UPDATE tasks SET status = $2, result = $3, updated_at = now()
             WHERE id = $1 AND status = 'running'",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(result)
        .execute(&self.pool)
        .await?;

        if outcome.rows_affected() == 0 {
            // Either the task does not exist or it already reached a
            // terminal state; distinguish so double transitions stay no-ops.
            let exists = sqlx::query("SELECT 1 FROM tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .is_some();
            if !exists {
                return Err(EngineError::NotFound(format!("Task {id} not found")));
            }
            warn!("Ignoring {} transition for task {id} not in running state", status.as_str());
        }
        Ok(())
    }
}
