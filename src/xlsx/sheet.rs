//! Rectangular worksheet grid.

use super::cell::CellValue;
use serde::{Deserialize, Serialize};

/// A worksheet read as a grid of raw cell values.
///
/// Fully blank rows are dropped and every remaining row is padded with
/// [`CellValue::Empty`] to the width of the widest row, so `rows[i][j]`
/// is always addressable for `j < width()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name as shown on the workbook tab
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Build a sheet from raw rows, normalizing them into a rectangle.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }

        Self {
            name: name.into(),
            rows,
        }
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Number of non-blank rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the sheet has no non-blank rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}
