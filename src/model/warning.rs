//! Non-fatal extraction problems.

use super::TableKind;
use serde::{Deserialize, Serialize};

/// A problem confined to one table.
///
/// None of these stop a conversion: the affected table (or field) falls
/// back to its empty value and the other tables are processed normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractWarning {
    /// The workbook has no sheet with the table's exact name.
    MissingSheet { table: TableKind },

    /// The column header row that starts the table's data was not found.
    MissingDataHeaderRow { table: TableKind },

    /// Table 2 has a header row but no activity label row after it.
    MissingActivityRow { table: TableKind },

    /// A numeric cell could not be parsed and was read as 0.
    MalformedCell {
        table: TableKind,
        /// Zero-based row index in the blank-row-free grid
        row: usize,
        /// Zero-based column index
        column: usize,
        value: String,
    },

    /// The sheet exists but could not be read.
    TableFailed { table: TableKind, reason: String },
}

impl ExtractWarning {
    /// The table this warning belongs to.
    pub fn table(&self) -> TableKind {
        match self {
            ExtractWarning::MissingSheet { table }
            | ExtractWarning::MissingDataHeaderRow { table }
            | ExtractWarning::MissingActivityRow { table }
            | ExtractWarning::MalformedCell { table, .. }
            | ExtractWarning::TableFailed { table, .. } => *table,
        }
    }
}

impl std::fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractWarning::MissingSheet { table } => {
                write!(f, "{}: sheet not found", table)
            }
            ExtractWarning::MissingDataHeaderRow { table } => {
                write!(f, "{}: data header row not found", table)
            }
            ExtractWarning::MissingActivityRow { table } => {
                write!(f, "{}: activity label row not found", table)
            }
            ExtractWarning::MalformedCell {
                table,
                row,
                column,
                value,
            } => write!(
                f,
                "{}: row {}, column {}: '{}' is not a number, using 0",
                table,
                row + 1,
                column + 1,
                value
            ),
            ExtractWarning::TableFailed { table, reason } => {
                write!(f, "{}: could not be read: {}", table, reason)
            }
        }
    }
}
