/// API route handlers, one module per resource
///
/// Handlers validate the request body, call the matching service in
/// `tasknest_shared::services` and serialize the result. Everything under
/// `/v1` except `auth/register` and `auth/login` requires a bearer token.

pub mod auth;
pub mod categories;
pub mod health;
pub mod subtasks;
pub mod tasks;
pub mod users;

use validator::Validate;

use crate::error::ApiResult;

/// Runs derive-based validation, mapping failures to a 422
pub(crate) fn validated<T: Validate>(request: T) -> ApiResult<T> {
    request.validate()?;
    Ok(request)
}
