//! Typed spreadsheet cells and their coercion to text and dates.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("Invalid regex pattern for dotted dates")
});

/// One decoded cell of the first worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    /// Numeric cell carrying a date format
    Date { serial: f64, value: Option<NaiveDate> },
    Bool(bool),
    /// Formula source without the leading `=`; the cached result is not kept
    Formula(String),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form of the cell.
    ///
    /// Numbers (date-formatted ones included) print the way a decimal value
    /// prints, so an integral `150` becomes `"150.0"`. Formula cells yield
    /// their source text, not the evaluated result. Empty and error cells
    /// have no text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Date { serial, .. } => Some(format_number(*serial)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Formula(source) => Some(source.clone()),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }

    /// Date form of the cell; anything unparseable is `None`
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date { value, .. } => *value,
            other => other.as_text().as_deref().and_then(parse_date_text),
        }
    }
}

/// Parses the first whitespace-separated token as `DD.MM.YYYY`, else ISO `YYYY-MM-DD`
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let token = text.split_whitespace().next()?;
    if DOTTED_DATE.is_match(token) {
        NaiveDate::parse_from_str(token, "%d.%m.%Y").ok()
    } else {
        NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
    }
}

/// Shortest round-trip form with at least one fractional digit; magnitudes
/// outside `[1e-3, 1e7)` use `<mantissa>E<exponent>`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return if n.is_nan() {
            "NaN".to_string()
        } else if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let abs = n.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        let plain = n.to_string();
        return if plain.contains('.') { plain } else { format!("{}.0", plain) };
    }

    let scientific = format!("{:e}", n);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}
