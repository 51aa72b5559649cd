/// Error types shared by the store and service layers
///
/// # Taxonomy
///
/// - `NotFound`: the resource id does not exist
/// - `Forbidden`: the resource exists but the actor does not own it
/// - `Conflict`: a uniqueness rule was violated (category name per owner,
///   user email / username)
/// - `InvalidInput`: a payload the service refuses to act on
/// - `Unauthorized`: credentials did not check out (login only)
/// - `Store`: the backing store failed
///
/// Services never retry and never fold one class into another: a NotFound
/// raised by the store surfaces as NotFound all the way to the caller.

use uuid::Uuid;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised by a `Store` implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }

        StoreError::Database(err)
    }
}

/// Errors returned by the service layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Resource exists but belongs to someone else
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Payload rejected by the service
    #[error("{0}")]
    InvalidInput(String),

    /// Bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] crate::auth::password::PasswordError),

    /// Token signing failure
    #[error(transparent)]
    Token(#[from] crate::auth::jwt::JwtError),
}

impl ServiceError {
    pub fn task_not_found(id: Uuid) -> Self {
        tracing::warn!(task_id = %id, "Task not found");
        ServiceError::NotFound("Task not found".to_string())
    }

    pub fn category_not_found(id: Uuid) -> Self {
        tracing::warn!(category_id = %id, "Category not found");
        ServiceError::NotFound("Category not found".to_string())
    }

    pub fn subtask_not_found(id: Uuid) -> Self {
        tracing::warn!(subtask_id = %id, "Subtask not found");
        ServiceError::NotFound("Subtask not found".to_string())
    }

    pub fn user_not_found(id: Uuid) -> Self {
        tracing::warn!(user_id = %id, "User not found");
        ServiceError::NotFound("User not found".to_string())
    }
}
