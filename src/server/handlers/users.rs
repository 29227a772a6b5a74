use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::database::entities::{users, UserRole};
use crate::server::app::AppState;
use crate::services::{UserInput, UserService};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

fn parse_role(role: &str) -> Result<UserRole, ApiError> {
    role.parse().map_err(ApiError::BadRequest)
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<users::Model>> {
    let service = UserService::new(state.db);
    let users = match query.role.as_deref() {
        Some(role) => service.list_by_role(parse_role(role)?).await?,
        None => service.list().await?,
    };
    Ok(Json(users))
}

pub async fn list_users_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Vec<users::Model>> {
    let role = parse_role(&role)?;
    Ok(Json(UserService::new(state.db).list_by_role(role).await?))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Vec<users::Model>> {
    Ok(Json(UserService::new(state.db).search_by_name(&query.name).await?))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<users::Model> {
    Ok(Json(UserService::new(state.db).find_by_email(&email).await?))
}

pub async fn list_division_users(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
) -> ApiResult<Vec<users::Model>> {
    Ok(Json(UserService::new(state.db).list_by_division(division_id).await?))
}

pub async fn list_division_users_by_role(
    State(state): State<AppState>,
    Path((division_id, role)): Path<(i32, String)>,
) -> ApiResult<Vec<users::Model>> {
    let role = parse_role(&role)?;
    let users = UserService::new(state.db)
        .list_by_division_and_role(division_id, role)
        .await?;
    Ok(Json(users))
}

pub async fn count_division_users(
    State(state): State<AppState>,
    Path(division_id): Path<i32>,
) -> ApiResult<u64> {
    Ok(Json(UserService::new(state.db).count_by_division(division_id).await?))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<users::Model> {
    Ok(Json(UserService::new(state.db).get(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserInput>,
) -> ApiResult<users::Model> {
    Ok(Json(UserService::new(state.db).create(payload).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UserInput>,
) -> ApiResult<users::Model> {
    Ok(Json(UserService::new(state.db).update(id, payload).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    UserService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
