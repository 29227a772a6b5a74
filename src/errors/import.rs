//! Import error types
//!
//! `ImportError` aborts a whole import and becomes the single entry of the
//! result's error list. `RowError` only fails the row it was raised for.

use thiserror::Error;

use super::ServiceError;

/// File-level import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// The uploaded bytes are not a readable workbook
    #[error("Failed to read file: {0}")]
    Unreadable(String),

    /// Workbook has no worksheet to read
    #[error("Failed to read file: workbook contains no sheets")]
    NoSheets,

    /// No row within the scan bound starts with the "№" marker
    #[error("Header row not found (first column must contain '№')")]
    HeaderNotFound,
}

impl ImportError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportError::Unreadable(_) | ImportError::NoSheets => "INVALID_FILE",
            ImportError::HeaderNotFound => "HEADER_NOT_FOUND",
        }
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Unreadable(err.to_string())
    }
}

/// Failure of a single import row
#[derive(Error, Debug)]
pub enum RowError {
    #[error("empty initiative name")]
    EmptyInitiative,

    #[error("invalid progress: {0}")]
    InvalidProgress(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_not_found_message() {
        let err = ImportError::HeaderNotFound;
        assert!(err.to_string().contains('№'));
        assert_eq!(err.error_code(), "HEADER_NOT_FOUND");
    }

    #[test]
    fn test_row_error_messages() {
        assert_eq!(RowError::EmptyInitiative.to_string(), "empty initiative name");
        assert_eq!(
            RowError::InvalidProgress("12a".to_string()).to_string(),
            "invalid progress: 12a"
        );
    }
}
