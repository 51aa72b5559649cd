//! Response projection
//!
//! Maps stored rows into the camelCase shapes clients see. Relations are
//! optional on every shape: a relation that was not loaded is left out of
//! the JSON entirely, while a loaded relation with no rows serializes as
//! `[]`. One type therefore covers every depth a call site wants to return.
//!
//! Scalar nullable columns (`description`, `dueDate`, `categoryId`,
//! `completedAt`) are always present and serialize as `null` when empty.
//!
//! # Example
//!
//! ```no_run
//! use tasknest_shared::models::task::Task;
//! use tasknest_shared::projection::TaskResponse;
//!
//! # fn example(task: Task) {
//! // Shallow: no user, category or subtasks keys in the JSON
//! let shallow = TaskResponse::from(task.clone());
//!
//! // Subtasks loaded but none exist: "subtasks": []
//! let with_subtasks = TaskResponse::from(task).with_subtasks(Vec::new());
//! # }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    category::Category,
    subtask::Subtask,
    task::{Priority, Task, TaskStatus},
    user::User,
};
use crate::query::PageMeta;

/// Owner identity embedded in a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Category label embedded in a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskResponse {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subtask> for SubtaskResponse {
    fn from(subtask: Subtask) -> Self {
        Self {
            id: subtask.id,
            title: subtask.title,
            completed: subtask.completed,
            task_id: subtask.task_id,
            created_at: subtask.created_at,
            updated_at: subtask.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<SubtaskResponse>>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            completed: task.completed,
            completed_at: task.completed_at,
            user_id: task.user_id,
            category_id: task.category_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
            user: None,
            category: None,
            subtasks: None,
        }
    }
}

impl TaskResponse {
    pub fn with_user(mut self, user: &User) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Marks subtasks as loaded; an empty vec still serializes as `[]`
    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks.into_iter().map(SubtaskResponse::from).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskResponse>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            color: category.color,
            user_id: category.user_id,
            created_at: category.created_at,
            updated_at: category.updated_at,
            tasks: None,
            task_count: None,
        }
    }
}

impl CategoryResponse {
    pub fn with_tasks(mut self, tasks: Vec<TaskResponse>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn with_task_count(mut self, count: i64) -> Self {
        self.task_count = Some(count);
        self
    }
}

/// Task counters shown on a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub active_tasks: i64,
}

/// Public user profile. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            stats: None,
        }
    }
}

impl UserResponse {
    pub fn with_stats(mut self, stats: UserStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
