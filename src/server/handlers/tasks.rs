use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use super::{ApiError, ApiResult, DateRange, KeywordQuery};
use crate::database::entities::{tasks, TaskStatus};
use crate::server::app::AppState;
use crate::services::task_service::today;
use crate::services::{ImportResult, NewTask, TaskImportService, TaskService};

/// Multipart field carrying the workbook
const UPLOAD_FIELD: &str = "file";

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Vec<tasks::Model>> {
    Ok(Json(TaskService::new(state.db).list().await?))
}

pub async fn list_goal_tasks(
    State(state): State<AppState>,
    Path(goal_id): Path<i32>,
) -> ApiResult<Vec<tasks::Model>> {
    Ok(Json(TaskService::new(state.db).list_by_goal(goal_id).await?))
}

pub async fn list_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Vec<tasks::Model>> {
    Ok(Json(TaskService::new(state.db).list_by_user(user_id).await?))
}

fn parse_status(status: &str) -> Result<TaskStatus, ApiError> {
    status.parse().map_err(ApiError::BadRequest)
}

pub async fn list_tasks_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Vec<tasks::Model>> {
    let status = parse_status(&status)?;
    Ok(Json(TaskService::new(state.db).list_by_status(status).await?))
}

pub async fn list_goal_tasks_by_status(
    State(state): State<AppState>,
    Path((goal_id, status)): Path<(i32, String)>,
) -> ApiResult<Vec<tasks::Model>> {
    let status = parse_status(&status)?;
    let tasks = TaskService::new(state.db)
        .list_by_goal_and_status(goal_id, status)
        .await?;
    Ok(Json(tasks))
}

pub async fn list_user_tasks_by_status(
    State(state): State<AppState>,
    Path((user_id, status)): Path<(i32, String)>,
) -> ApiResult<Vec<tasks::Model>> {
    let status = parse_status(&status)?;
    let tasks = TaskService::new(state.db)
        .list_by_user_and_status(user_id, status)
        .await?;
    Ok(Json(tasks))
}

pub async fn count_goal_tasks(
    State(state): State<AppState>,
    Path(goal_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(TaskService::new(state.db).count_by_goal(goal_id).await?))
}

pub async fn count_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(TaskService::new(state.db).count_by_user(user_id).await?))
}

pub async fn search_tasks(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Vec<tasks::Model>> {
    Ok(Json(TaskService::new(state.db).search(&query.keyword).await?))
}

/// Tasks whose end date falls within the range
pub async fn list_tasks_by_end_date(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<tasks::Model>> {
    let (start, end) = range.bounds()?;
    let tasks = TaskService::new(state.db)
        .list_by_end_date_range(start, end)
        .await?;
    Ok(Json(tasks))
}

pub async fn list_overdue_tasks(State(state): State<AppState>) -> ApiResult<Vec<tasks::Model>> {
    Ok(Json(TaskService::new(state.db).list_overdue(today()).await?))
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<tasks::Model> {
    Ok(Json(TaskService::new(state.db).get(id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<NewTask>,
) -> ApiResult<tasks::Model> {
    Ok(Json(TaskService::new(state.db).create(payload).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<NewTask>,
) -> ApiResult<tasks::Model> {
    Ok(Json(TaskService::new(state.db).update(id, payload).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    TaskService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Imports tasks from an uploaded workbook.
///
/// Answers 200 with the import summary even when rows failed; only a
/// request without a `file` part is rejected.
pub async fn import_tasks(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ImportResult> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        info!("Received import file '{}' ({} bytes)", file_name, bytes.len());

        let result = TaskImportService::new(state.db).import_bytes(&bytes).await;
        return Ok(Json(result));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}
