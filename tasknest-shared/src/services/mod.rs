//! Service layer
//!
//! Each operation follows the same shape: find, authorize, mutate, then
//! re-read and project. Services take the store as `&dyn Store` and the
//! authenticated actor's id; they never see HTTP types.
//!
//! - `accounts`: register / login / me
//! - `users`: profile read, update, delete
//! - `categories`: category CRUD with per-owner name uniqueness
//! - `tasks`: task CRUD, filtered listing, toggle, statistics
//! - `subtasks`: subtask CRUD and toggle, authorized through the parent task

use crate::error::{ServiceError, StoreError};

pub mod accounts;
pub mod categories;
pub mod subtasks;
pub mod tasks;
pub mod users;

/// Turns a unique-constraint failure into a Conflict with `message`
pub(crate) fn conflict_on_unique(err: StoreError, message: &str) -> ServiceError {
    match err {
        StoreError::UniqueViolation(constraint) => {
            tracing::warn!(constraint = %constraint, "Unique constraint rejected write");
            ServiceError::Conflict(message.to_string())
        }
        other => ServiceError::Store(other),
    }
}
