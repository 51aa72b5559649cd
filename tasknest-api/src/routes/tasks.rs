/// Task endpoints
///
/// ```text
/// POST   /v1/tasks                        201
/// GET    /v1/tasks?status&priority&categoryId&sortBy&order&search&page&limit
/// GET    /v1/tasks/stats/summary
/// GET    /v1/tasks/:id
/// PATCH  /v1/tasks/:id
/// DELETE /v1/tasks/:id                    204
/// POST   /v1/tasks/:id/toggle-complete
/// ```
///
/// Unknown `sortBy` / `order` values and out-of-range `page` / `limit` are
/// normalized by the query builder; a malformed `status`, `priority` or
/// `categoryId` is rejected by the `Query` extractor with 400.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tasknest_shared::auth::middleware::AuthUser;
use tasknest_shared::models::{
    double_option,
    task::{Priority, TaskStatus, UpdateTask},
};
use tasknest_shared::projection::{Paginated, TaskResponse};
use tasknest_shared::query::TaskFilter;
use tasknest_shared::services::tasks::{self, NewTask};
use tasknest_shared::stats::TaskStats;
use uuid::Uuid;
use validator::Validate;

use super::validated;
use crate::app::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

/// Partial update; `null` clears a nullable field, an absent key leaves it
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            due_date: req.due_date,
            completed: req.completed,
            category_id: req.category_id,
        }
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let req = validated(req)?;

    let task = tasks::create(
        state.store.as_ref(),
        user.user_id,
        NewTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            category_id: req.category_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<Paginated<TaskResponse>>> {
    Ok(Json(tasks::list(state.store.as_ref(), user.user_id, filter).await?))
}

pub async fn task_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<TaskStats>> {
    Ok(Json(tasks::stats(state.store.as_ref(), user.user_id).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(tasks::get(state.store.as_ref(), id, user.user_id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let req = validated(req)?;
    Ok(Json(
        tasks::update(state.store.as_ref(), id, user.user_id, req.into()).await?,
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    tasks::delete(state.store.as_ref(), id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(tasks::toggle(state.store.as_ref(), id, user.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_and_absent() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"dueDate": null, "completed": true}"#).unwrap();

        assert_eq!(req.due_date, Some(None));
        assert_eq!(req.category_id, None);
        assert_eq!(req.completed, Some(true));

        let patch = UpdateTask::from(req);
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.status, None);
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "", "priority": "HIGH", "dueDate": "2024-05-01"}"#).unwrap();

        assert_eq!(req.priority, Some(Priority::High));
        assert_eq!(req.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(req.validate().is_err());
    }
}
