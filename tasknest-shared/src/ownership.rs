//! Ownership guard
//!
//! Every category and task carries an owning `user_id`; subtasks inherit the
//! owner of their parent task. Existence is checked before ownership, so a
//! missing resource is reported as NotFound and a foreign one as Forbidden.
//!
//! # Example
//!
//! ```
//! use tasknest_shared::ownership::{authorize, Forbidden};
//! use uuid::Uuid;
//!
//! let owner = Uuid::new_v4();
//! assert!(authorize(owner, owner).is_ok());
//! assert_eq!(authorize(owner, Uuid::new_v4()), Err(Forbidden));
//! ```

use std::fmt;

use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{category::Category, subtask::Subtask, task::Task};

/// Kind of guarded resource, used for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Task,
    Subtask,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Category => write!(f, "category"),
            Resource::Task => write!(f, "task"),
            Resource::Subtask => write!(f, "subtask"),
        }
    }
}

/// The actor does not own the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Access denied")]
pub struct Forbidden;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("{} not found", capitalize(.0))]
    NotFound(Resource),

    #[error("You do not have access to this {0}")]
    Forbidden(Resource),
}

fn capitalize(resource: &Resource) -> String {
    let name = resource.to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

impl From<OwnershipError> for ServiceError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::NotFound(_) => ServiceError::NotFound(err.to_string()),
            OwnershipError::Forbidden(_) => ServiceError::Forbidden(err.to_string()),
        }
    }
}

/// A resource with a directly stored owner
pub trait Owned {
    const RESOURCE: Resource;

    fn owner_id(&self) -> Uuid;
}

impl Owned for Task {
    const RESOURCE: Resource = Resource::Task;

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Category {
    const RESOURCE: Resource = Resource::Category;

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Allows the action only when the actor is the owner
pub fn authorize(owner_id: Uuid, actor_id: Uuid) -> Result<(), Forbidden> {
    if owner_id == actor_id {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Resolves a lookup result: NotFound first, then ownership
pub fn guard<T: Owned>(found: Option<T>, actor_id: Uuid) -> Result<T, OwnershipError> {
    let resource = found.ok_or(OwnershipError::NotFound(T::RESOURCE))?;

    authorize(resource.owner_id(), actor_id).map_err(|_| {
        tracing::warn!(resource = %T::RESOURCE, actor_id = %actor_id, "Ownership check failed");
        OwnershipError::Forbidden(T::RESOURCE)
    })?;

    Ok(resource)
}

/// Resolves a subtask through its parent task's owner
///
/// A parent that vanished between the two lookups is reported as the
/// subtask not being found.
pub fn guard_subtask(
    subtask: Subtask,
    parent: Option<&Task>,
    actor_id: Uuid,
) -> Result<Subtask, OwnershipError> {
    let parent = parent.ok_or(OwnershipError::NotFound(Resource::Subtask))?;

    authorize(parent.user_id, actor_id).map_err(|_| {
        tracing::warn!(subtask_id = %subtask.id, actor_id = %actor_id, "Subtask ownership check failed");
        OwnershipError::Forbidden(Resource::Subtask)
    })?;

    Ok(subtask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{Priority, TaskStatus};
    use chrono::Utc;

    fn task_owned_by(user_id: Uuid) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            priority: Priority::Medium,
            status: TaskStatus::Active,
            due_date: None,
            completed: false,
            completed_at: None,
            user_id,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn subtask_of(task: &Task) -> Subtask {
        let now = Utc::now();
        Subtask {
            id: Uuid::new_v4(),
            title: "s".to_string(),
            completed: false,
            task_id: task.id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_guard_not_found_before_forbidden() {
        let actor = Uuid::new_v4();
        let err = guard::<Task>(None, actor).unwrap_err();
        assert_eq!(err, OwnershipError::NotFound(Resource::Task));
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_guard_forbidden_for_foreign_owner() {
        let err = guard(Some(task_owned_by(Uuid::new_v4())), Uuid::new_v4()).unwrap_err();
        assert_eq!(err, OwnershipError::Forbidden(Resource::Task));
        assert_eq!(err.to_string(), "You do not have access to this task");
    }

    #[test]
    fn test_guard_passes_owner() {
        let actor = Uuid::new_v4();
        let task = guard(Some(task_owned_by(actor)), actor).unwrap();
        assert_eq!(task.user_id, actor);
    }

    #[test]
    fn test_subtask_uses_parent_owner() {
        let owner = Uuid::new_v4();
        let parent = task_owned_by(owner);
        let subtask = subtask_of(&parent);

        assert!(guard_subtask(subtask.clone(), Some(&parent), owner).is_ok());

        let err = guard_subtask(subtask.clone(), Some(&parent), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "You do not have access to this subtask");

        let err = guard_subtask(subtask, None, owner).unwrap_err();
        assert_eq!(err.to_string(), "Subtask not found");
    }

    #[test]
    fn test_service_error_mapping() {
        let not_found: ServiceError = OwnershipError::NotFound(Resource::Category).into();
        assert!(matches!(not_found, ServiceError::NotFound(ref m) if m == "Category not found"));

        let forbidden: ServiceError = OwnershipError::Forbidden(Resource::Category).into();
        assert!(matches!(forbidden, ServiceError::Forbidden(_)));
    }
}
