/// Authentication endpoints
///
/// ```text
/// POST /v1/auth/register   public
/// POST /v1/auth/login      public
/// GET  /v1/auth/me         bearer token
/// ```

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tasknest_shared::auth::{middleware::AuthUser, password};
use tasknest_shared::projection::UserResponse;
use tasknest_shared::services::accounts::{self, AuthResponse, Registration};
use validator::Validate;

use super::validated;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use crate::extract::ApiJson;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters long"))]
    pub username: String,

    pub password: String,

    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let req = validated(req)?;

    if req.password != req.password_confirm {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }
    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail::new("password", message)])
    })?;

    let response = accounts::register(
        state.store.as_ref(),
        &state.jwt,
        Registration {
            email: req.email,
            username: req.username,
            password: req.password,
            password_confirm: req.password_confirm,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let req = validated(req)?;
    let response = accounts::login(state.store.as_ref(), &state.jwt, &req.email, &req.password).await?;
    Ok(Json(response))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(accounts::me(state.store.as_ref(), user.user_id).await?))
}
