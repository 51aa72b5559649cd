/// Task model and database operations
///
/// Tasks are the core entity of TaskNest. Each task is owned by exactly one
/// user and optionally filed under one of that user's categories.
///
/// # Completion invariant
///
/// ```text
/// completed == true  <=>  status == COMPLETED
/// completed_at.is_some()  <=>  completed == true
/// ```
///
/// The three fields are only ever written together, through
/// [`CompletionState`](crate::completion::CompletionState).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
/// CREATE TYPE task_status AS ENUM ('ACTIVE', 'COMPLETED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     status task_status NOT NULL DEFAULT 'ACTIVE',
///     due_date DATE,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at TIMESTAMPTZ,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task::{Task, CreateTask, Priority};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Write release notes".to_string(),
///     description: None,
///     priority: Some(Priority::High),
///     due_date: None,
///     category_id: None,
///     user_id: Uuid::new_v4(),
/// }).await?;
///
/// assert!(!task.completed);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::completion::CompletionState;
use crate::query::{TaskCount, TaskQuery};

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, completed, \
                            completed_at, user_id, category_id, created_at, updated_at";

/// Task priority
///
/// Variant order carries no meaning; sorting goes through the explicit rank
/// table in [`crate::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "ACTIVE",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,

    /// Calendar date, no time component
    pub due_date: Option<NaiveDate>,

    pub completed: bool,

    /// Server-set instant of the last transition to COMPLETED
    pub completed_at: Option<DateTime<Utc>>,

    /// Owner
    pub user_id: Uuid,

    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// Completion fields are not accepted here: every task starts ACTIVE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,

    /// Defaults to MEDIUM
    pub priority: Option<Priority>,

    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub user_id: Uuid,
}

/// Partial update for a task
///
/// Plain fields overwrite when `Some`; nullable fields use `Some(None)` to
/// clear. `status` and `completed` are completion signals and are resolved
/// by the completion state machine, not copied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub category_id: Option<Option<Uuid>>,
}

impl Task {
    /// Current completion fields
    pub fn completion(&self) -> CompletionState {
        CompletionState {
            status: self.status,
            completed: self.completed,
            completed_at: self.completed_at,
        }
    }

    /// Replaces all three completion fields at once
    pub fn set_completion(&mut self, state: CompletionState) {
        self.status = state.status;
        self.completed = state.completed;
        self.completed_at = state.completed_at;
    }

    /// Applies a partial update in place, routing the completion signals
    /// through the state machine
    pub fn apply(&mut self, patch: UpdateTask, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }

        let next = self
            .completion()
            .apply_update(patch.status, patch.completed, now);
        self.set_completion(next);
    }

    /// Inserts a new task in the initial ACTIVE state
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let initial = CompletionState::initial();

        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, priority, status, due_date,
                               completed, completed_at, user_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority.unwrap_or_default())
        .bind(initial.status)
        .bind(data.due_date)
        .bind(initial.completed)
        .bind(initial.completed_at)
        .bind(data.user_id)
        .bind(data.category_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Runs a normalized filter query
    ///
    /// Returns the requested page and the full matching count. The two
    /// statements share the same predicate, so `total` never depends on the
    /// page window.
    pub async fn query(pool: &PgPool, query: &TaskQuery) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        query.push_where(&mut select);
        query.push_order_by(&mut select);
        select
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        query.push_where(&mut count);

        let rows = select.build_query_as::<Task>().fetch_all(pool).await?;
        let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Counts tasks matching a count specification
    pub async fn count(pool: &PgPool, spec: &TaskCount) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        spec.push_where(&mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
        Ok(count)
    }

    /// Task counts per category for one owner, in a single grouped query.
    /// Categories without tasks are absent from the result.
    pub async fn count_by_category(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT category_id, COUNT(*) FROM tasks
             WHERE user_id = $1 AND category_id IS NOT NULL
             GROUP BY category_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every task filed under a category, newest first
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE category_id = $1 ORDER BY created_at DESC, id ASC"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    /// Writes every mutable column back and bumps `updated_at`
    ///
    /// Last write wins: there is no version check. Returns `None` when the
    /// row was deleted in the meantime.
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, priority = $4, status = $5,
                due_date = $6, completed = $7, completed_at = $8,
                category_id = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.completed_at)
        .bind(task.category_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a task; its subtasks go with it
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
