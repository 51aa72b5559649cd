/// Subtask endpoints
///
/// ```text
/// POST   /v1/subtasks                      201
/// PATCH  /v1/subtasks/:id
/// DELETE /v1/subtasks/:id                  204
/// POST   /v1/subtasks/:id/toggle-complete
/// ```

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::auth::middleware::AuthUser;
use tasknest_shared::models::subtask::UpdateSubtask;
use tasknest_shared::projection::SubtaskResponse;
use tasknest_shared::services::subtasks::{self, NewSubtask};
use uuid::Uuid;
use validator::Validate;

use super::validated;
use crate::app::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubtaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    pub task_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubtaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    pub completed: Option<bool>,
}

pub async fn create_subtask(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateSubtaskRequest>,
) -> ApiResult<(StatusCode, Json<SubtaskResponse>)> {
    let req = validated(req)?;

    let subtask = subtasks::create(
        state.store.as_ref(),
        user.user_id,
        NewSubtask {
            title: req.title,
            task_id: req.task_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(subtask)))
}

pub async fn update_subtask(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateSubtaskRequest>,
) -> ApiResult<Json<SubtaskResponse>> {
    let req = validated(req)?;
    let patch = UpdateSubtask {
        title: req.title,
        completed: req.completed,
    };

    Ok(Json(subtasks::update(state.store.as_ref(), id, user.user_id, patch).await?))
}

pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    subtasks::delete(state.store.as_ref(), id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_subtask(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SubtaskResponse>> {
    Ok(Json(subtasks::toggle(state.store.as_ref(), id, user.user_id).await?))
}
