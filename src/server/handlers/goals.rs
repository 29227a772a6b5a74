use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::{ApiError, ApiResult, DateRange, KeywordQuery};
use crate::database::entities::goals;
use crate::server::app::AppState;
use crate::services::task_service::today;
use crate::services::{GoalInput, GoalService};

pub async fn list_goals(State(state): State<AppState>) -> ApiResult<Vec<goals::Model>> {
    Ok(Json(GoalService::new(state.db).list().await?))
}

pub async fn list_division_goals(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
) -> ApiResult<Vec<goals::Model>> {
    Ok(Json(GoalService::new(state.db).list_by_division(division_id).await?))
}

pub async fn list_division_goals_by_deadline(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<goals::Model>> {
    let (start, end) = range.bounds()?;
    let goals = GoalService::new(state.db)
        .list_by_division_and_deadline_range(division_id, start, end)
        .await?;
    Ok(Json(goals))
}

pub async fn count_division_goals(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(GoalService::new(state.db).count_by_division(division_id).await?))
}

pub async fn list_overdue_goals(State(state): State<AppState>) -> ApiResult<Vec<goals::Model>> {
    Ok(Json(GoalService::new(state.db).list_overdue(today()).await?))
}

pub async fn list_completed_goals(State(state): State<AppState>) -> ApiResult<Vec<goals::Model>> {
    Ok(Json(GoalService::new(state.db).list_completed().await?))
}

pub async fn search_goals(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Vec<goals::Model>> {
    Ok(Json(GoalService::new(state.db).search(&query.keyword).await?))
}

pub async fn list_goals_by_deadline(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> ApiResult<Vec<goals::Model>> {
    let (start, end) = range.bounds()?;
    let goals = GoalService::new(state.db)
        .list_by_deadline_range(start, end)
        .await?;
    Ok(Json(goals))
}

pub async fn get_goal(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<goals::Model> {
    Ok(Json(GoalService::new(state.db).get(id).await?))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalInput>,
) -> ApiResult<goals::Model> {
    Ok(Json(GoalService::new(state.db).create(payload).await?))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<GoalInput>,
) -> ApiResult<goals::Model> {
    Ok(Json(GoalService::new(state.db).update(id, payload).await?))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    GoalService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
