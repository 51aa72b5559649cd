//! Subtask operations
//!
//! Subtasks have no owner column; every check resolves the parent task and
//! compares its owner with the actor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::subtask::{CreateSubtask, Subtask, UpdateSubtask};
use crate::ownership::{guard, guard_subtask};
use crate::projection::SubtaskResponse;
use crate::store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubtask {
    pub title: String,
    pub task_id: Uuid,
}

async fn find_owned(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<Subtask> {
    let subtask = store
        .find_subtask(id)
        .await?
        .ok_or_else(|| ServiceError::subtask_not_found(id))?;

    let parent = store.find_task(subtask.task_id).await?;
    Ok(guard_subtask(subtask, parent.as_ref(), actor_id)?)
}

async fn save(store: &dyn Store, subtask: &Subtask) -> ServiceResult<SubtaskResponse> {
    let saved = store
        .save_subtask(subtask)
        .await?
        .ok_or_else(|| ServiceError::subtask_not_found(subtask.id))?;
    Ok(saved.into())
}

/// Adds a subtask to one of the actor's tasks
pub async fn create(
    store: &dyn Store,
    actor_id: Uuid,
    data: NewSubtask,
) -> ServiceResult<SubtaskResponse> {
    let parent = store.find_task(data.task_id).await?;
    guard(parent, actor_id)?;

    let subtask = store
        .create_subtask(CreateSubtask {
            title: data.title,
            task_id: data.task_id,
        })
        .await?;

    tracing::info!(subtask_id = %subtask.id, task_id = %subtask.task_id, "Subtask created");
    Ok(subtask.into())
}

pub async fn update(
    store: &dyn Store,
    id: Uuid,
    actor_id: Uuid,
    patch: UpdateSubtask,
) -> ServiceResult<SubtaskResponse> {
    let mut subtask = find_owned(store, id, actor_id).await?;
    subtask.apply(patch);

    let response = save(store, &subtask).await?;
    tracing::info!(subtask_id = %id, "Subtask updated");
    Ok(response)
}

pub async fn delete(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
    find_owned(store, id, actor_id).await?;

    if !store.delete_subtask(id).await? {
        return Err(ServiceError::subtask_not_found(id));
    }

    tracing::info!(subtask_id = %id, "Subtask deleted");
    Ok(())
}

/// Flips `completed`
pub async fn toggle(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<SubtaskResponse> {
    let mut subtask = find_owned(store, id, actor_id).await?;
    subtask.completed = !subtask.completed;

    save(store, &subtask).await
}
