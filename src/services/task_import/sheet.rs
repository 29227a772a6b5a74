//! First-worksheet decoding and header lookup.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::{debug, warn};

use super::cells::CellValue;
use crate::errors::ImportError;

/// The header search covers rows `0..=HEADER_SCAN_LIMIT`
pub const HEADER_SCAN_LIMIT: usize = 20;

pub const HEADER_MARKER: &str = "№";

static EMPTY: CellValue = CellValue::Empty;

/// Decoded worksheet addressed by absolute (zero-based) row and column.
///
/// Rows without a single non-empty cell are stored as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Option<Vec<CellValue>>>,
}

impl SheetGrid {
    /// Grid from dense rows starting at row 0, column 0
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|cells| {
                if cells.iter().all(CellValue::is_empty) {
                    None
                } else {
                    Some(cells)
                }
            })
            .collect();
        Self { rows }
    }

    fn from_sparse(cells: BTreeMap<(usize, usize), CellValue>) -> Self {
        let mut dense: Vec<Vec<CellValue>> = Vec::new();
        for ((row, col), value) in cells {
            if dense.len() <= row {
                dense.resize_with(row + 1, Vec::new);
            }
            let line = &mut dense[row];
            if line.len() <= col {
                line.resize(col + 1, CellValue::Empty);
            }
            line[col] = value;
        }
        Self::from_rows(dense)
    }

    /// Index of the last row, `None` for an empty sheet
    pub fn last_row(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).and_then(|row| row.as_deref())
    }

    /// First row within the scan bound whose first cell trims to `№`
    pub fn find_header_row(&self) -> Option<usize> {
        let last = self.last_row()?;
        (0..=HEADER_SCAN_LIMIT.min(last)).find(|&index| {
            self.row(index)
                .and_then(|cells| cell(cells, 0).as_text())
                .map_or(false, |text| text.trim() == HEADER_MARKER)
        })
    }
}

/// Cell at `col`, `Empty` past the end of the row
pub fn cell(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&EMPTY)
}

/// Decodes the first worksheet of an xlsx/xls/ods workbook.
///
/// Formula cells keep their source text in place of the cached value.
pub fn read_first_sheet(bytes: &[u8]) -> Result<SheetGrid, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoSheets)?;
    debug!("Reading worksheet '{}'", sheet_name);

    let values = workbook.worksheet_range(&sheet_name)?;
    let formulas = match workbook.worksheet_formula(&sheet_name) {
        Ok(formulas) => Some(formulas),
        Err(e) => {
            warn!("Could not read formulas of '{}': {}", sheet_name, e);
            None
        }
    };

    let mut cells = BTreeMap::new();
    if let Some((row0, col0)) = values.start() {
        for (r, line) in values.rows().enumerate() {
            for (c, data) in line.iter().enumerate() {
                let value = decode(data);
                if !value.is_empty() {
                    cells.insert((row0 as usize + r, col0 as usize + c), value);
                }
            }
        }
    }
    if let Some(formulas) = formulas {
        overlay_formulas(&mut cells, &formulas);
    }

    Ok(SheetGrid::from_sparse(cells))
}

fn overlay_formulas(cells: &mut BTreeMap<(usize, usize), CellValue>, formulas: &Range<String>) {
    let Some((row0, col0)) = formulas.start() else {
        return;
    };
    for (r, c, source) in formulas.used_cells() {
        if !source.is_empty() {
            cells.insert(
                (row0 as usize + r, col0 as usize + c),
                CellValue::Formula(source.clone()),
            );
        }
    }
}

fn decode(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date {
            serial: dt.as_f64(),
            value: dt.as_datetime().map(|moment| moment.date()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
