use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::database::entities::divisions;
use crate::server::app::AppState;
use crate::services::{DivisionCounts, DivisionInput, DivisionService, ReportService};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

pub async fn list_divisions(State(state): State<AppState>) -> ApiResult<Vec<divisions::Model>> {
    Ok(Json(DivisionService::new(state.db).list().await?))
}

pub async fn search_divisions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<divisions::Model>> {
    Ok(Json(DivisionService::new(state.db).search_by_name(&query.name).await?))
}

pub async fn get_division(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<divisions::Model> {
    Ok(Json(DivisionService::new(state.db).get(id).await?))
}

pub async fn get_division_counts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<DivisionCounts> {
    let service = DivisionService::new(state.db);
    service.get(id).await?;
    Ok(Json(service.counts(id).await?))
}

pub async fn count_division_reports(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<u64> {
    DivisionService::new(state.db.clone()).get(id).await?;
    Ok(Json(ReportService::new(state.db).count_by_division(id).await?))
}

pub async fn create_division(
    State(state): State<AppState>,
    Json(payload): Json<DivisionInput>,
) -> ApiResult<divisions::Model> {
    Ok(Json(DivisionService::new(state.db).create(payload).await?))
}

pub async fn update_division(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<DivisionInput>,
) -> ApiResult<divisions::Model> {
    Ok(Json(DivisionService::new(state.db).update(id, payload).await?))
}

pub async fn delete_division(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    DivisionService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
