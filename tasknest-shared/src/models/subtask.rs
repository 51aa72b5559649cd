/// Subtask model and database operations
///
/// Subtasks carry no owner column. Access is decided through the parent
/// task's `user_id`, so there is a single source of truth for ownership.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subtasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const SUBTASK_COLUMNS: &str = "id, title, completed, task_id, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,

    /// Parent task
    pub task_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtask {
    pub title: String,
    pub task_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtask {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl Subtask {
    pub fn apply(&mut self, patch: UpdateSubtask) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    /// Inserts a new, not-yet-completed subtask
    pub async fn create(pool: &PgPool, data: CreateSubtask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(&format!(
            "INSERT INTO subtasks (title, task_id) VALUES ($1, $2) RETURNING {SUBTASK_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.task_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the subtasks of every task in `task_ids`, oldest first
    pub async fn list_by_tasks(pool: &PgPool, task_ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Subtask>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ANY($1) ORDER BY created_at ASC, id ASC"
        ))
        .bind(task_ids)
        .fetch_all(pool)
        .await
    }

    pub async fn save(pool: &PgPool, subtask: &Subtask) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(&format!(
            r#"
            UPDATE subtasks
            SET title = $2, completed = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {SUBTASK_COLUMNS}
            "#
        ))
        .bind(subtask.id)
        .bind(&subtask.title)
        .bind(subtask.completed)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let now = Utc::now();
        let mut subtask = Subtask {
            id: Uuid::new_v4(),
            title: "Review".to_string(),
            completed: false,
            task_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        subtask.apply(UpdateSubtask {
            completed: Some(true),
            ..Default::default()
        });

        assert!(subtask.completed);
        assert_eq!(subtask.title, "Review");
    }
}
