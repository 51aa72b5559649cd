/// User profile endpoints
///
/// ```text
/// GET    /v1/users/:id
/// PATCH  /v1/users/:id
/// DELETE /v1/users/:id   204
/// ```

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::auth::middleware::AuthUser;
use tasknest_shared::models::user::UpdateUser;
use tasknest_shared::projection::UserResponse;
use tasknest_shared::services::users;
use uuid::Uuid;
use validator::Validate;

use super::validated;
use crate::app::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters long"))]
    pub username: Option<String>,
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(users::get(state.store.as_ref(), id, user.user_id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let req = validated(req)?;
    let patch = UpdateUser {
        email: req.email,
        username: req.username,
    };

    Ok(Json(users::update(state.store.as_ref(), id, user.user_id, patch).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    users::delete(state.store.as_ref(), id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
