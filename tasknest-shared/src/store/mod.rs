/// Persistence seam for the service layer
///
/// Services talk to storage only through the [`Store`] trait. Two
/// implementations ship with the crate:
///
/// - [`PgStore`]: PostgreSQL through the sqlx model functions
/// - [`MemoryStore`]: in-process maps for tests and local runs
///
/// Both honor the same relational rules:
///
/// - deleting a user removes its categories, tasks and their subtasks
/// - deleting a task removes its subtasks
/// - deleting a category nulls `category_id` on its tasks
/// - email and username are unique; category name is unique per owner
///
/// Each delete applies its cascade atomically: once it returns, no
/// dependent row is retrievable.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasknest_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), tasknest_shared::error::StoreError> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    category::{Category, CreateCategory},
    subtask::{CreateSubtask, Subtask},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};
use crate::query::{TaskCount, TaskQuery};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations needed by the services
///
/// `find_*` return `Ok(None)` for a missing id. `save_*` write every
/// mutable field of the given row and return `Ok(None)` if the row is gone.
/// `delete_*` return whether a row was removed.
#[async_trait]
pub trait Store: Send + Sync {
    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn save_user(&self, user: &User) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_category(&self, data: CreateCategory) -> StoreResult<Category>;
    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>>;
    async fn find_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>>;
    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>>;
    async fn save_category(&self, category: &Category) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// One page of matching tasks plus the full matching count
    async fn query_tasks(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, i64)>;

    async fn count_tasks(&self, spec: &TaskCount) -> StoreResult<i64>;

    /// Task count per category of `user_id`; empty categories are absent
    async fn count_tasks_by_category(&self, user_id: Uuid) -> StoreResult<HashMap<Uuid, i64>>;

    async fn list_category_tasks(&self, category_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_subtask(&self, data: CreateSubtask) -> StoreResult<Subtask>;
    async fn find_subtask(&self, id: Uuid) -> StoreResult<Option<Subtask>>;

    /// Subtasks of every task in `task_ids`, oldest first
    async fn list_subtasks(&self, task_ids: &[Uuid]) -> StoreResult<Vec<Subtask>>;

    async fn save_subtask(&self, subtask: &Subtask) -> StoreResult<Option<Subtask>>;
    async fn delete_subtask(&self, id: Uuid) -> StoreResult<bool>;
}
