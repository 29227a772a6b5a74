use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;

use super::{ApiError, ApiResult, DateRange, KeywordQuery};
use crate::database::entities::reports;
use crate::server::app::AppState;
use crate::services::{ReportInput, ReportService};

pub async fn list_reports(State(state): State<AppState>) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).list().await?))
}

/// Newest report date first
pub async fn list_latest_reports(State(state): State<AppState>) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).list_latest().await?))
}

pub async fn search_reports(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).search(&query.keyword).await?))
}

pub async fn list_reports_by_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).list_by_date(date).await?))
}

pub async fn list_reports_by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<reports::Model>> {
    let (start, end) = range.bounds()?;
    Ok(Json(ReportService::new(state.db).list_by_date_range(start, end).await?))
}

pub async fn list_user_reports(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).list_by_user(user_id).await?))
}

pub async fn count_user_reports(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(ReportService::new(state.db).count_by_user(user_id).await?))
}

pub async fn list_user_division_reports(
    State(state): State<AppState>,
    Path((user_id, division_id)): Path<(i32, i32)>,
) -> ApiResult<Vec<reports::Model>> {
    let reports = ReportService::new(state.db)
        .list_by_user_and_division(user_id, division_id)
        .await?;
    Ok(Json(reports))
}

pub async fn list_division_reports(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
) -> ApiResult<Vec<reports::Model>> {
    Ok(Json(ReportService::new(state.db).list_by_division(division_id).await?))
}

pub async fn list_division_reports_by_date_range(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<reports::Model>> {
    let (start, end) = range.bounds()?;
    let reports = ReportService::new(state.db)
        .list_by_division_and_date_range(division_id, start, end)
        .await?;
    Ok(Json(reports))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<reports::Model> {
    Ok(Json(ReportService::new(state.db).get(id).await?))
}

pub async fn create_report(
    State(state): State<AppState>,
    Json(payload): Json<ReportInput>,
) -> ApiResult<reports::Model> {
    Ok(Json(ReportService::new(state.db).create(payload).await?))
}

pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReportInput>,
) -> ApiResult<reports::Model> {
    Ok(Json(ReportService::new(state.db).update(id, payload).await?))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    ReportService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
