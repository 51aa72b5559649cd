/// In-memory store
///
/// Keeps all four tables behind one lock so every cascade is applied in a
/// single critical section. Filtering, sorting and counting reuse the
/// in-memory rendering of [`TaskQuery`] and [`TaskCount`], which mirrors the
/// SQL rendering used by [`PgStore`](super::PgStore).
///
/// Unique constraints are reported with the same constraint names the
/// PostgreSQL schema uses.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::error::StoreError;
use crate::models::{
    category::{Category, CreateCategory},
    subtask::{CreateSubtask, Subtask},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};
use crate::completion::CompletionState;
use crate::query::{TaskCount, TaskQuery};

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const CATEGORIES_USER_NAME_KEY: &str = "categories_user_name_key";

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    tasks: HashMap<Uuid, Task>,
    subtasks: HashMap<Uuid, Subtask>,
}

impl Tables {
    fn check_user_unique(&self, id: Uuid, email: &str, username: &str) -> StoreResult<()> {
        for other in self.users.values().filter(|u| u.id != id) {
            if other.email == email {
                return Err(StoreError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
            }
            if other.username == username {
                return Err(StoreError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
            }
        }
        Ok(())
    }

    fn check_category_unique(&self, id: Uuid, user_id: Uuid, name: &str) -> StoreResult<()> {
        let taken = self
            .categories
            .values()
            .any(|c| c.id != id && c.user_id == user_id && c.name == name);

        if taken {
            Err(StoreError::UniqueViolation(
                CATEGORIES_USER_NAME_KEY.to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn remove_task(&mut self, id: Uuid) -> bool {
        let removed = self.tasks.remove(&id).is_some();
        if removed {
            self.subtasks.retain(|_, s| s.task_id != id);
        }
        removed
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let id = Uuid::new_v4();
        tables.check_user_unique(id, &data.email, &data.username)?;

        let now = Utc::now();
        let user = User {
            id,
            email: data.email,
            username: data.username,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Ok(None);
        }
        tables.check_user_unique(user.id, &user.email, &user.username)?;

        let Some(stored) = tables.users.get_mut(&user.id) else {
            return Ok(None);
        };
        stored.email = user.email.clone();
        stored.username = user.username.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<Uuid> = tables
            .tasks
            .values()
            .filter(|t| t.user_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in owned {
            tables.remove_task(task_id);
        }
        tables.categories.retain(|_, c| c.user_id != id);

        Ok(true)
    }

    async fn create_category(&self, data: CreateCategory) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        let id = Uuid::new_v4();
        tables.check_category_unique(id, data.user_id, &data.name)?;

        let now = Utc::now();
        let category = Category {
            id,
            name: data.name,
            description: data.description,
            color: data.color,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn find_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.categories.get(id).cloned())
            .collect())
    }

    async fn list_categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn save_category(&self, category: &Category) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category.id) {
            return Ok(None);
        }
        tables.check_category_unique(category.id, category.user_id, &category.name)?;

        let Some(stored) = tables.categories.get_mut(&category.id) else {
            return Ok(None);
        };
        stored.name = category.name.clone();
        stored.description = category.description.clone();
        stored.color = category.color.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }

        for task in tables.tasks.values_mut() {
            if task.category_id == Some(id) {
                task.category_id = None;
            }
        }
        Ok(true)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let initial = CompletionState::initial();
        let now = Utc::now();

        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            priority: data.priority.unwrap_or_default(),
            status: initial.status,
            due_date: data.due_date,
            completed: initial.completed,
            completed_at: initial.completed_at,
            user_id: data.user_id,
            category_id: data.category_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn query_tasks(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, i64)> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Task> = tables.tasks.values().filter(|t| query.matches(t)).collect();
        matching.sort_by(|a, b| query.compare(a, b));

        let total = matching.len() as i64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);

        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count_tasks(&self, spec: &TaskCount) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().filter(|t| spec.matches(t)).count() as i64)
    }

    async fn count_tasks_by_category(&self, user_id: Uuid) -> StoreResult<HashMap<Uuid, i64>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for category_id in tables
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| t.category_id)
        {
            *counts.entry(category_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_category_tasks(&self, category_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.category_id == Some(category_id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.tasks.get_mut(&task.id) else {
            return Ok(None);
        };

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.priority = task.priority;
        stored.status = task.status;
        stored.due_date = task.due_date;
        stored.completed = task.completed;
        stored.completed_at = task.completed_at;
        stored.category_id = task.category_id;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.remove_task(id))
    }

    async fn create_subtask(&self, data: CreateSubtask) -> StoreResult<Subtask> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let subtask = Subtask {
            id: Uuid::new_v4(),
            title: data.title,
            completed: false,
            task_id: data.task_id,
            created_at: now,
            updated_at: now,
        };
        tables.subtasks.insert(subtask.id, subtask.clone());
        Ok(subtask)
    }

    async fn find_subtask(&self, id: Uuid) -> StoreResult<Option<Subtask>> {
        Ok(self.tables.read().await.subtasks.get(&id).cloned())
    }

    async fn list_subtasks(&self, task_ids: &[Uuid]) -> StoreResult<Vec<Subtask>> {
        let tables = self.tables.read().await;
        let mut subtasks: Vec<Subtask> = tables
            .subtasks
            .values()
            .filter(|s| task_ids.contains(&s.task_id))
            .cloned()
            .collect();
        subtasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(subtasks)
    }

    async fn save_subtask(&self, subtask: &Subtask) -> StoreResult<Option<Subtask>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.subtasks.get_mut(&subtask.id) else {
            return Ok(None);
        };

        stored.title = subtask.title.clone();
        stored.completed = subtask.completed;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_subtask(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.subtasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;
    use crate::query::TaskFilter;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(CreateUser {
                email: format!("{name}@example.com"),
                username: name.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn task(store: &MemoryStore, user_id: Uuid, category_id: Option<Uuid>) -> Task {
        store
            .create_task(CreateTask {
                title: "task".to_string(),
                description: None,
                priority: None,
                due_date: None,
                category_id,
                user_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let store = MemoryStore::new();
        user(&store, "ada").await;

        let err = store
            .create_user(CreateUser {
                email: "ada@example.com".to_string(),
                username: "other".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == USERS_EMAIL_KEY));
    }

    #[tokio::test]
    async fn test_category_name_unique_per_owner() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let bob = user(&store, "bob").await;

        let create = |user_id| CreateCategory {
            name: "Work".to_string(),
            description: None,
            color: None,
            user_id,
        };

        store.create_category(create(ada.id)).await.unwrap();
        assert!(store.create_category(create(ada.id)).await.is_err());
        assert!(store.create_category(create(bob.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_task_initial_state() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let created = task(&store, ada.id, None).await;

        assert_eq!(created.priority, Priority::Medium);
        assert!(created.completion().is_consistent());
        assert!(!created.completed);
    }

    #[tokio::test]
    async fn test_delete_category_nulls_task_reference() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let category = store
            .create_category(CreateCategory {
                name: "Work".to_string(),
                description: None,
                color: None,
                user_id: ada.id,
            })
            .await
            .unwrap();
        let filed = task(&store, ada.id, Some(category.id)).await;

        assert!(store.delete_category(category.id).await.unwrap());
        let reloaded = store.find_task(filed.id).await.unwrap().unwrap();
        assert!(reloaded.category_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let owned = task(&store, ada.id, None).await;
        let subtask = store
            .create_subtask(CreateSubtask {
                title: "step".to_string(),
                task_id: owned.id,
            })
            .await
            .unwrap();

        assert!(store.delete_user(ada.id).await.unwrap());
        assert!(store.find_task(owned.id).await.unwrap().is_none());
        assert!(store.find_subtask(subtask.id).await.unwrap().is_none());
        assert!(!store.delete_user(ada.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_pages_and_counts() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let bob = user(&store, "bob").await;
        for _ in 0..3 {
            task(&store, ada.id, None).await;
        }
        task(&store, bob.id, None).await;

        let query = TaskQuery::new(
            ada.id,
            TaskFilter {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
        );
        let (rows, total) = store.query_tasks(&query).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|t| t.user_id == ada.id));
    }

    #[tokio::test]
    async fn test_save_missing_row_returns_none() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let gone = task(&store, ada.id, None).await;
        store.delete_task(gone.id).await.unwrap();

        assert!(store.save_task(&gone).await.unwrap().is_none());
    }
}
