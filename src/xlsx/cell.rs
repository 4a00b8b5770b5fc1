//! Typed cell values and the coercions the extractor relies on.

use serde::{Deserialize, Serialize};

/// A raw spreadsheet cell value.
///
/// Booleans are carried as `TRUE`/`FALSE` text and cell errors as their
/// error literal (`#N/A`), since the extractor only ever compares text or
/// parses numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True for an empty cell or a zero-length string.
    ///
    /// A numeric zero is a value, not a blank.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Borrow the text of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as display text.
    ///
    /// Integral numbers print without a fractional part (`150`, not `150.0`).
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    /// Coerce the value to an integer. See [`parse_number`].
    pub fn parse_number(&self) -> i64 {
        parse_number(self)
    }

    /// True when a non-empty value could not be read as a number and
    /// [`parse_number`] fell back to zero.
    pub fn is_malformed_number(&self) -> bool {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => parse_numeric_text(s).is_none(),
            CellValue::Number(n) => !n.is_finite(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Coerce a cell to a whole number.
///
/// - empty cells are `0`
/// - numbers are rounded half-up (`2.5 -> 3`, `-2.5 -> -2`)
/// - text has every character other than digits, `.` and `-` stripped
///   (`"1,234.9" -> 1235`, `"$ 500" -> 500`) and is then parsed and rounded
/// - anything that still does not parse, or is not finite, is `0`
pub fn parse_number(value: &CellValue) -> i64 {
    match value {
        CellValue::Empty => 0,
        CellValue::Number(n) => round_half_up(*n),
        CellValue::Text(s) => parse_numeric_text(s).map(round_half_up).unwrap_or(0),
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn round_half_up(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    (n + 0.5).floor() as i64
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Number of columns in a worksheet; the last one is `XFD`.
pub const MAX_COLUMNS: usize = 16_384;

/// Zero-based column index of an A1-style reference (`"C5"` -> 2).
///
/// Returns `None` when the reference has no column letters.
pub fn column_index(reference: &str) -> Option<usize> {
    let letters = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase());

    let mut index = 0usize;
    let mut seen = false;
    for letter in letters {
        seen = true;
        index = index
            .checked_mul(26)?
            .checked_add((letter - b'A' + 1) as usize)?;
    }

    if seen {
        Some(index - 1)
    } else {
        None
    }
}
