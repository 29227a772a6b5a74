//! Service error types
//!
//! Errors raised by the entity services (divisions, goals, users, tasks).
//! The REST layer maps them onto HTTP status codes, the importer records
//! their message against the failing row.

use thiserror::Error;

/// Entity service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Entity not found by ID
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Entity not found by a natural key such as an email address
    #[error("{entity} {key} not found")]
    NotFoundByKey { entity: &'static str, key: String },

    /// Input rejected by a business rule
    #[error("{0}")]
    Validation(String),

    /// Operation conflicts with existing data
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Unexpected failure outside the database
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound { .. }
                | ServiceError::NotFoundByKey { .. }
                | ServiceError::Validation(_)
                | ServiceError::Conflict(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound { .. } | ServiceError::NotFoundByKey { .. }
        )
    }

    /// Check if this is a server error (500-series)
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServiceError::Database(_) | ServiceError::Internal(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } | ServiceError::NotFoundByKey { .. } => "NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_FAILED",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Database(_) => "DATABASE_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServiceError::Internal(format!("Failed to hash password: {}", err))
    }
}
