/// Category endpoints
///
/// ```text
/// POST   /v1/categories       201
/// GET    /v1/categories
/// GET    /v1/categories/:id
/// PATCH  /v1/categories/:id
/// DELETE /v1/categories/:id   204
/// ```

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::auth::middleware::AuthUser;
use tasknest_shared::models::{category::is_hex_color, category::UpdateCategory, double_option};
use tasknest_shared::projection::CategoryResponse;
use tasknest_shared::services::categories::{self, NewCategory};
use uuid::Uuid;
use validator::Validate;

use super::validated;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use crate::extract::{ApiJson, ApiPath};

const COLOR_MESSAGE: &str = "Color must be a valid hex color code (e.g., #FF5733)";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
}

fn check_color(color: Option<&str>) -> ApiResult<()> {
    match color {
        Some(value) if !is_hex_color(value) => Err(ApiError::ValidationError(vec![
            ValidationErrorDetail::new("color", COLOR_MESSAGE),
        ])),
        _ => Ok(()),
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let req = validated(req)?;
    check_color(req.color.as_deref())?;

    let category = categories::create(
        state.store.as_ref(),
        user.user_id,
        NewCategory {
            name: req.name,
            description: req.description,
            color: req.color,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    Ok(Json(categories::list(state.store.as_ref(), user.user_id).await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    Ok(Json(categories::get(state.store.as_ref(), id, user.user_id).await?))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let req = validated(req)?;
    check_color(req.color.as_ref().and_then(|c| c.as_deref()))?;

    let patch = UpdateCategory {
        name: req.name,
        description: req.description,
        color: req.color,
    };

    Ok(Json(categories::update(state.store.as_ref(), id, user.user_id, patch).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    categories::delete(state.store.as_ref(), id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
