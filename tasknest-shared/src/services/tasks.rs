//! Task operations
//!
//! Reads go through the filter builder and come back with category,
//! subtasks and owner loaded. Writes resolve completion through the state
//! machine and are re-read with relations before projection.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{CreateTask, Priority, Task, UpdateTask};
use crate::ownership::guard;
use crate::projection::{Paginated, TaskResponse};
use crate::query::{TaskFilter, TaskQuery};
use crate::stats::{self, DayWindow, TaskStats};
use crate::store::Store;

/// Fields a client may set when creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

/// Checks that a referenced category exists and belongs to the actor
async fn check_category(store: &dyn Store, category_id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
    let category = store.find_category(category_id).await?;
    guard(category, actor_id)?;
    Ok(())
}

async fn find_owned(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<Task> {
    let task = store.find_task(id).await?;
    Ok(guard(task, actor_id)?)
}

/// Projects tasks with category, subtasks and owner loaded
///
/// Relations are fetched in batches, one call per relation kind.
pub async fn load_relations(store: &dyn Store, tasks: Vec<Task>) -> ServiceResult<Vec<TaskResponse>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut category_ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.category_id).collect();
    category_ids.sort();
    category_ids.dedup();
    let mut user_ids: Vec<Uuid> = tasks.iter().map(|t| t.user_id).collect();
    user_ids.sort();
    user_ids.dedup();

    let categories: HashMap<Uuid, _> = store
        .find_categories(&category_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut subtasks: HashMap<Uuid, Vec<_>> = HashMap::new();
    for subtask in store.list_subtasks(&task_ids).await? {
        subtasks.entry(subtask.task_id).or_default().push(subtask);
    }

    let mut users = HashMap::new();
    for user_id in user_ids {
        if let Some(user) = store.find_user(user_id).await? {
            users.insert(user_id, user);
        }
    }

    let responses = tasks
        .into_iter()
        .map(|task| {
            let category = task.category_id.and_then(|id| categories.get(&id));
            let user = users.get(&task.user_id);
            let own_subtasks = subtasks.remove(&task.id).unwrap_or_default();

            let mut response = TaskResponse::from(task).with_subtasks(own_subtasks);
            if let Some(category) = category {
                response = response.with_category(category);
            }
            if let Some(user) = user {
                response = response.with_user(user);
            }
            response
        })
        .collect();

    Ok(responses)
}

async fn load_one(store: &dyn Store, task: Task) -> ServiceResult<TaskResponse> {
    let id = task.id;
    load_relations(store, vec![task])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::task_not_found(id))
}

/// Creates a task in the initial ACTIVE state
pub async fn create(store: &dyn Store, actor_id: Uuid, data: NewTask) -> ServiceResult<TaskResponse> {
    if let Some(category_id) = data.category_id {
        check_category(store, category_id, actor_id).await?;
    }

    let task = store
        .create_task(CreateTask {
            title: data.title,
            description: data.description,
            priority: data.priority,
            due_date: data.due_date,
            category_id: data.category_id,
            user_id: actor_id,
        })
        .await?;

    tracing::info!(task_id = %task.id, user_id = %actor_id, "Task created");

    let task = store
        .find_task(task.id)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(task.id))?;
    load_one(store, task).await
}

/// Lists the actor's tasks through the filter builder
pub async fn list(
    store: &dyn Store,
    actor_id: Uuid,
    filter: TaskFilter,
) -> ServiceResult<Paginated<TaskResponse>> {
    let query = TaskQuery::new(actor_id, filter);
    let (tasks, total) = store.query_tasks(&query).await?;

    tracing::debug!(user_id = %actor_id, total, page = query.page, "Listed tasks");

    Ok(Paginated {
        data: load_relations(store, tasks).await?,
        meta: query.meta(total),
    })
}

pub async fn get(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<TaskResponse> {
    let task = find_owned(store, id, actor_id).await?;
    load_one(store, task).await
}

/// Applies a partial update
///
/// Plain fields overwrite when present; `status` / `completed` go through
/// the completion state machine.
pub async fn update(
    store: &dyn Store,
    id: Uuid,
    actor_id: Uuid,
    patch: UpdateTask,
) -> ServiceResult<TaskResponse> {
    let mut task = find_owned(store, id, actor_id).await?;

    if let Some(Some(category_id)) = patch.category_id {
        check_category(store, category_id, actor_id).await?;
    }

    task.apply(patch, Utc::now());

    let saved = store
        .save_task(&task)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(id))?;

    tracing::info!(task_id = %id, status = saved.status.as_str(), "Task updated");
    load_one(store, saved).await
}

/// Deletes a task and its subtasks
pub async fn delete(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
    find_owned(store, id, actor_id).await?;

    if !store.delete_task(id).await? {
        return Err(ServiceError::task_not_found(id));
    }

    tracing::info!(task_id = %id, user_id = %actor_id, "Task deleted");
    Ok(())
}

/// Flips completion
pub async fn toggle(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<TaskResponse> {
    let mut task = find_owned(store, id, actor_id).await?;
    task.set_completion(task.completion().toggle(Utc::now()));

    let saved = store
        .save_task(&task)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(id))?;

    tracing::info!(task_id = %id, completed = saved.completed, "Task toggled");
    load_one(store, saved).await
}

/// Dashboard statistics for the actor, relative to the server's local date
pub async fn stats(store: &dyn Store, actor_id: Uuid) -> ServiceResult<TaskStats> {
    Ok(stats::collect(store, actor_id, DayWindow::local_today()).await?)
}
