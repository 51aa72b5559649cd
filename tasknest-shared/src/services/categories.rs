//! Category operations

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conflict_on_unique;
use crate::error::{ServiceError, ServiceResult};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::ownership::guard;
use crate::projection::{CategoryResponse, TaskResponse};
use crate::store::Store;

const NAME_TAKEN: &str = "Category with this name already exists for this user";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

async fn find_owned(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<Category> {
    let category = store.find_category(id).await?;
    Ok(guard(category, actor_id)?)
}

async fn ensure_name_free(store: &dyn Store, actor_id: Uuid, name: &str) -> ServiceResult<()> {
    if store.find_category_by_name(actor_id, name).await?.is_some() {
        tracing::warn!(user_id = %actor_id, name = %name, "Category name already in use");
        return Err(ServiceError::Conflict(NAME_TAKEN.to_string()));
    }
    Ok(())
}

pub async fn create(
    store: &dyn Store,
    actor_id: Uuid,
    data: NewCategory,
) -> ServiceResult<CategoryResponse> {
    ensure_name_free(store, actor_id, &data.name).await?;

    let category = store
        .create_category(CreateCategory {
            name: data.name,
            description: data.description,
            color: data.color,
            user_id: actor_id,
        })
        .await
        .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?;

    tracing::info!(category_id = %category.id, user_id = %actor_id, "Category created");
    Ok(category.into())
}

/// Every category of the actor, each with its task count
pub async fn list(store: &dyn Store, actor_id: Uuid) -> ServiceResult<Vec<CategoryResponse>> {
    let (categories, counts) = tokio::try_join!(
        store.list_categories(actor_id),
        store.count_tasks_by_category(actor_id),
    )?;

    Ok(categories
        .into_iter()
        .map(|category| {
            let count = counts.get(&category.id).copied().unwrap_or(0);
            CategoryResponse::from(category).with_task_count(count)
        })
        .collect())
}

/// One category with its tasks, each task carrying its subtasks
pub async fn get(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<CategoryResponse> {
    let category = find_owned(store, id, actor_id).await?;
    let tasks = store.list_category_tasks(category.id).await?;

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut subtasks: HashMap<Uuid, Vec<_>> = HashMap::new();
    for subtask in store.list_subtasks(&task_ids).await? {
        subtasks.entry(subtask.task_id).or_default().push(subtask);
    }

    let tasks: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|task| {
            let own = subtasks.remove(&task.id).unwrap_or_default();
            TaskResponse::from(task).with_subtasks(own)
        })
        .collect();

    Ok(CategoryResponse::from(category).with_tasks(tasks))
}

/// Applies a partial update; renaming onto a name the actor already uses
/// is a Conflict
pub async fn update(
    store: &dyn Store,
    id: Uuid,
    actor_id: Uuid,
    patch: UpdateCategory,
) -> ServiceResult<CategoryResponse> {
    let mut category = find_owned(store, id, actor_id).await?;

    if let Some(name) = patch.name.as_deref() {
        if name != category.name {
            ensure_name_free(store, actor_id, name).await?;
        }
    }

    category.apply(patch);

    let saved = store
        .save_category(&category)
        .await
        .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?
        .ok_or_else(|| ServiceError::category_not_found(id))?;

    tracing::info!(category_id = %id, "Category updated");
    Ok(saved.into())
}

/// Deletes a category; its tasks stay with `categoryId = null`
pub async fn delete(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
    find_owned(store, id, actor_id).await?;

    if !store.delete_category(id).await? {
        return Err(ServiceError::category_not_found(id));
    }

    tracing::info!(category_id = %id, user_id = %actor_id, "Category deleted");
    Ok(())
}
