//! Domain-specific error types
//!
//! - **ServiceError**: entity services and the stores the importer consumes
//! - **ImportError**: file-level import failures (unreadable workbook, missing header)
//! - **RowError**: a single spreadsheet row that could not be imported
//!
//! ```rust
//! use bank_analytics::errors::{RowError, ServiceError};
//!
//! let err = ServiceError::NotFound { entity: "goal", id: 7 };
//! assert!(err.is_not_found());
//!
//! let row = RowError::InvalidProgress("abc".to_string());
//! assert_eq!(row.to_string(), "invalid progress: abc");
//! ```

pub mod import;
pub mod service;

pub use import::{ImportError, RowError};
pub use service::ServiceError;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
