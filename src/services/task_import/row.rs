//! Fixed column layout of an import row.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use super::cells::CellValue;
use super::sheet::cell;
use crate::errors::RowError;

pub mod columns {
    pub const LABEL: usize = 0;
    pub const DIVISION: usize = 1;
    pub const INITIATIVE: usize = 2;
    pub const TASK_TITLE: usize = 3;
    pub const TASK_DESCRIPTION: usize = 4;
    pub const EXPECTED_RESULT: usize = 5;
    pub const BLOCK: usize = 6;
    pub const TARGET_VALUE: usize = 7;
    pub const STATUS: usize = 8;
    pub const PROGRESS: usize = 9;
    pub const START_DATE: usize = 10;
    pub const END_DATE: usize = 11;
    pub const ACTUAL_RESULT: usize = 12;
    pub const IMPACT: usize = 13;
}

/// Raw field values of one data row; absent cells are `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    pub label: Option<String>,
    pub division: Option<String>,
    pub initiative: Option<String>,
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    pub expected_result: Option<String>,
    pub block: Option<String>,
    pub target_value: Option<String>,
    pub status: Option<String>,
    pub progress: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub actual_result: Option<String>,
    pub impact: Option<String>,
}

impl ImportRow {
    pub fn from_cells(cells: &[CellValue]) -> Self {
        let text = |col: usize| cell(cells, col).as_text();
        let date = |col: usize| cell(cells, col).as_date();

        Self {
            label: text(columns::LABEL),
            division: text(columns::DIVISION),
            initiative: text(columns::INITIATIVE),
            task_title: text(columns::TASK_TITLE),
            task_description: text(columns::TASK_DESCRIPTION),
            expected_result: text(columns::EXPECTED_RESULT),
            block: text(columns::BLOCK),
            target_value: text(columns::TARGET_VALUE),
            status: text(columns::STATUS),
            progress: text(columns::PROGRESS),
            start_date: date(columns::START_DATE),
            end_date: date(columns::END_DATE),
            actual_result: text(columns::ACTUAL_RESULT),
            impact: text(columns::IMPACT),
        }
    }

    /// Parsed progress; blank is `None`, anything but an integer fails the row
    pub fn parsed_progress(&self) -> Result<Option<i32>, RowError> {
        match non_blank(&self.progress) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|_| RowError::InvalidProgress(self.progress.clone().unwrap_or_default())),
        }
    }

    /// Parsed target value; an unparseable value is logged and dropped
    pub fn parsed_target_value(&self) -> Option<Decimal> {
        let raw = non_blank(&self.target_value)?;
        match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Could not parse target value: {}", raw);
                None
            }
        }
    }
}

/// Trimmed value, `None` when absent or blank
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
