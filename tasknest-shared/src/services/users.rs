//! User profile operations
//!
//! A user may only read, change or delete their own profile. Reads report a
//! missing user before a foreign one; updates and deletes reject a foreign
//! id before looking anything up.

use uuid::Uuid;

use super::conflict_on_unique;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::models::{task::TaskStatus, user::UpdateUser};
use crate::ownership::authorize;
use crate::projection::{UserResponse, UserStats};
use crate::query::TaskCount;
use crate::store::Store;

const EMAIL_TAKEN: &str = "Email already exists";
const USERNAME_TAKEN: &str = "Username already exists";

fn forbidden(id: Uuid, actor_id: Uuid, message: &str) -> ServiceError {
    tracing::warn!(user_id = %id, actor_id = %actor_id, "Cross-user profile access denied");
    ServiceError::Forbidden(message.to_string())
}

/// Profile task counters, fetched concurrently
async fn user_stats(store: &dyn Store, user_id: Uuid) -> ServiceResult<UserStats> {
    let all = TaskCount::all(user_id);
    let completed = all.clone().completed(true);
    let active = all.clone().status(TaskStatus::Active);

    let (total_tasks, completed_tasks, active_tasks) = tokio::try_join!(
        store.count_tasks(&all),
        store.count_tasks(&completed),
        store.count_tasks(&active),
    )?;

    Ok(UserStats {
        total_tasks,
        completed_tasks,
        active_tasks,
    })
}

/// Own profile with task counters
pub async fn get(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<UserResponse> {
    let user = store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(id))?;

    authorize(user.id, actor_id)
        .map_err(|_| forbidden(id, actor_id, "You can only access your own profile"))?;

    let stats = user_stats(store, id).await?;
    Ok(UserResponse::from(user).with_stats(stats))
}

/// Changes email and/or username
pub async fn update(
    store: &dyn Store,
    id: Uuid,
    actor_id: Uuid,
    patch: UpdateUser,
) -> ServiceResult<UserResponse> {
    authorize(id, actor_id)
        .map_err(|_| forbidden(id, actor_id, "You can only update your own profile"))?;

    let mut user = store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(id))?;

    if let Some(email) = patch.email.as_deref() {
        if email != user.email && store.find_user_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }
    }
    if let Some(username) = patch.username.as_deref() {
        if username != user.username && store.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
        }
    }

    user.apply(patch);

    let saved = store
        .save_user(&user)
        .await
        .map_err(|e| {
            let message = match &e {
                StoreError::UniqueViolation(c) if c.contains("username") => USERNAME_TAKEN,
                _ => EMAIL_TAKEN,
            };
            conflict_on_unique(e, message)
        })?
        .ok_or_else(|| ServiceError::user_not_found(id))?;

    tracing::info!(user_id = %id, "User profile updated");
    Ok(saved.into())
}

/// Deletes the account and everything it owns
pub async fn delete(store: &dyn Store, id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
    authorize(id, actor_id)
        .map_err(|_| forbidden(id, actor_id, "You can only delete your own account"))?;

    if store.find_user(id).await?.is_none() || !store.delete_user(id).await? {
        return Err(ServiceError::user_not_found(id));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(())
}
