pub mod divisions;
pub mod goals;
pub mod health;
pub mod reports;
pub mod task_reports;
pub mod tasks;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;

use crate::errors::ServiceError;

/// Error body returned by every REST handler
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            ApiError::Service(err) => (err.error_code(), err.to_string()),
            ApiError::BadRequest(message) => ("BAD_REQUEST", message.clone()),
        };
        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        let body = serde_json::json!({
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`, both bounds inclusive
#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), ApiError> {
        if self.start > self.end {
            return Err(ApiError::BadRequest(
                "Range start cannot be after range end".to_string(),
            ));
        }
        Ok((self.start, self.end))
    }
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: String,
}
