use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;

use super::{ApiError, ApiResult, KeywordQuery};
use crate::database::entities::task_reports;
use crate::server::app::AppState;
use crate::services::{TaskReportInput, TaskReportService};

pub async fn list_task_reports(
    State(state): State<AppState>,
) -> ApiResult<Vec<task_reports::Model>> {
    Ok(Json(TaskReportService::new(state.db).list().await?))
}

pub async fn list_by_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> ApiResult<Vec<task_reports::Model>> {
    Ok(Json(TaskReportService::new(state.db).list_by_task(task_id).await?))
}

pub async fn list_by_report(
    State(state): State<AppState>,
    Path(report_id): Path<i32>,
) -> ApiResult<Vec<task_reports::Model>> {
    Ok(Json(TaskReportService::new(state.db).list_by_report(report_id).await?))
}

pub async fn list_by_task_and_report(
    State(state): State<AppState>,
    Path((task_id, report_id)): Path<(i32, i32)>,
) -> ApiResult<Vec<task_reports::Model>> {
    let entries = TaskReportService::new(state.db)
        .list_by_task_and_report(task_id, report_id)
        .await?;
    Ok(Json(entries))
}

pub async fn list_by_min_progress(
    State(state): State<AppState>,
    Path(min_progress): Path<String>,
) -> ApiResult<Vec<task_reports::Model>> {
    let min_progress = Decimal::from_str(&min_progress)
        .map_err(|_| ApiError::BadRequest(format!("Invalid progress: {}", min_progress)))?;
    let entries = TaskReportService::new(state.db)
        .list_by_min_progress(min_progress)
        .await?;
    Ok(Json(entries))
}

pub async fn search_task_reports(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Vec<task_reports::Model>> {
    Ok(Json(TaskReportService::new(state.db).search(&query.keyword).await?))
}

pub async fn count_by_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(TaskReportService::new(state.db).count_by_task(task_id).await?))
}

pub async fn count_by_report(
    State(state): State<AppState>,
    Path(report_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(TaskReportService::new(state.db).count_by_report(report_id).await?))
}

pub async fn average_progress_by_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> ApiResult<Decimal> {
    let average = TaskReportService::new(state.db)
        .average_progress_by_task(task_id)
        .await?;
    Ok(Json(average))
}

pub async fn get_task_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<task_reports::Model> {
    Ok(Json(TaskReportService::new(state.db).get(id).await?))
}

pub async fn create_task_report(
    State(state): State<AppState>,
    Json(payload): Json<TaskReportInput>,
) -> ApiResult<task_reports::Model> {
    Ok(Json(TaskReportService::new(state.db).create(payload).await?))
}

pub async fn update_task_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TaskReportInput>,
) -> ApiResult<task_reports::Model> {
    Ok(Json(TaskReportService::new(state.db).update(id, payload).await?))
}

pub async fn delete_task_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    TaskReportService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
