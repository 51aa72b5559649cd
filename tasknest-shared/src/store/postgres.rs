/// PostgreSQL-backed store
///
/// Thin delegation to the model functions; cascade and set-null rules are
/// enforced by the foreign keys declared in the migrations.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    category::{Category, CreateCategory},
    subtask::{CreateSubtask, Subtask},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};
use crate::query::{TaskCount, TaskQuery};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn save_user(&self, user: &User) -> StoreResult<Option<User>> {
        Ok(User::save(&self.pool, user).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn create_category(&self, data: CreateCategory) -> StoreResult<Category> {
        Ok(Category::create(&self.pool, data).await?)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_id(&self.pool, id).await?)
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_name(&self.pool, user_id, name).await?)
    }

    async fn find_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>> {
        Ok(Category::find_by_ids(&self.pool, ids).await?)
    }

    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        Ok(Category::list_by_user(&self.pool, user_id).await?)
    }

    async fn save_category(&self, category: &Category) -> StoreResult<Option<Category>> {
        Ok(Category::save(&self.pool, category).await?)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Category::delete(&self.pool, id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn query_tasks(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, i64)> {
        Ok(Task::query(&self.pool, query).await?)
    }

    async fn count_tasks(&self, spec: &TaskCount) -> StoreResult<i64> {
        Ok(Task::count(&self.pool, spec).await?)
    }

    async fn count_tasks_by_category(&self, user_id: Uuid) -> StoreResult<HashMap<Uuid, i64>> {
        Ok(Task::count_by_category(&self.pool, user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn list_category_tasks(&self, category_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_category(&self.pool, category_id).await?)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        Ok(Task::save(&self.pool, task).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn create_subtask(&self, data: CreateSubtask) -> StoreResult<Subtask> {
        Ok(Subtask::create(&self.pool, data).await?)
    }

    async fn find_subtask(&self, id: Uuid) -> StoreResult<Option<Subtask>> {
        Ok(Subtask::find_by_id(&self.pool, id).await?)
    }

    async fn list_subtasks(&self, task_ids: &[Uuid]) -> StoreResult<Vec<Subtask>> {
        Ok(Subtask::list_by_tasks(&self.pool, task_ids).await?)
    }

    async fn save_subtask(&self, subtask: &Subtask) -> StoreResult<Option<Subtask>> {
        Ok(Subtask::save(&self.pool, subtask).await?)
    }

    async fn delete_subtask(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Subtask::delete(&self.pool, id).await?)
    }
}
