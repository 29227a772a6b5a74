use serde::{Deserialize, Serialize};

/// Outcome of one data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success,
    /// Present but intentionally incomplete; not counted anywhere
    Skipped,
    /// Formatted message for the result's error list
    Failure(String),
}

/// Summary returned by every import, successful or not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl ImportResult {
    /// A file-level failure: zero totals and a single message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::from_parts(0, 0, vec![message.into()])
    }

    /// `error_count` always mirrors the length of `errors`
    pub fn from_parts(total_rows: usize, success_count: usize, errors: Vec<String>) -> Self {
        Self {
            total_rows,
            success_count,
            error_count: errors.len(),
            errors,
        }
    }

    /// Folds per-row outcomes; skipped rows count toward nothing
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = RowOutcome>) -> Self {
        let mut total_rows = 0;
        let mut success_count = 0;
        let mut errors = Vec::new();

        for outcome in outcomes {
            match outcome {
                RowOutcome::Success => {
                    total_rows += 1;
                    success_count += 1;
                }
                RowOutcome::Failure(message) => {
                    total_rows += 1;
                    errors.push(message);
                }
                RowOutcome::Skipped => {}
            }
        }

        Self::from_parts(total_rows, success_count, errors)
    }
}
