//! Keyword classification of template lines.
//!
//! The CbC template puts its title, group name, fiscal year and currency on
//! free-form lines above each table. They are recognized by substring, the
//! way a reader of the template would spot them.

use crate::model::TableKind;
use crate::xlsx::CellValue;

const MNE_GROUP_LABEL: &str = "NAME OF THE MNE GROUP";
const FISCAL_YEAR_LABEL: &str = "FISCAL YEAR CONCERNED";
const CURRENCY_LABEL: &str = "CURRENCY USED";

/// What a sheet line is, as far as the extractor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The table title line
    Title,
    /// `NAME OF THE MNE GROUP: ...`
    MneGroup,
    /// `FISCAL YEAR CONCERNED: ...`
    FiscalYear,
    /// `CURRENCY USED: ...` (Table 1 only)
    Currency,
    /// The column header row that precedes the table's data
    DataHeader,
    /// Anything else
    Unrecognized,
}

impl LineKind {
    /// Lines that are re-emitted verbatim as report headers.
    pub fn is_header_line(&self) -> bool {
        matches!(
            self,
            LineKind::Title | LineKind::MneGroup | LineKind::FiscalYear | LineKind::Currency
        )
    }
}

/// Title marker for each table. The case differs between tables because the
/// template itself is inconsistent.
pub fn title_marker(table: TableKind) -> &'static str {
    match table {
        TableKind::Table1 => "TABLE 1",
        TableKind::Table2 => "Table 2",
        TableKind::Table3 => "TABLE 3",
    }
}

/// Text of a row: every cell's text joined by one space, then trimmed.
///
/// Interior blanks are kept, so `["A", "", "B"]` reads `"A  B"`.
pub fn row_text(row: &[CellValue]) -> String {
    row.iter()
        .map(CellValue::to_text)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Classify one sheet line.
///
/// Labels are checked in the order title, MNE group, fiscal year, currency
/// and the first hit wins. Only a line with no label can be a data header.
pub fn classify_line(table: TableKind, text: &str, row: &[CellValue]) -> LineKind {
    if text.contains(title_marker(table)) {
        LineKind::Title
    } else if text.contains(MNE_GROUP_LABEL) {
        LineKind::MneGroup
    } else if text.contains(FISCAL_YEAR_LABEL) {
        LineKind::FiscalYear
    } else if table == TableKind::Table1 && text.contains(CURRENCY_LABEL) {
        LineKind::Currency
    } else if is_data_header(table, row) {
        LineKind::DataHeader
    } else {
        LineKind::Unrecognized
    }
}

/// Check whether `row` is the column header row that starts the data.
///
/// - Table 1: first cell is `Tax jurisdiction` (surrounding blanks ignored)
/// - Table 2: first cell is `Tax Jurisdiction` (surrounding blanks ignored)
///   and the second mentions `Constituent Entities`
/// - Table 3: cells are exactly `S/N` and `Description`
pub fn is_data_header(table: TableKind, row: &[CellValue]) -> bool {
    let first = row.first();
    let second = row.get(1);

    match table {
        TableKind::Table1 => first.is_some_and(|c| c.to_text().trim() == "Tax jurisdiction"),
        TableKind::Table2 => {
            first.is_some_and(|c| c.to_text().trim() == "Tax Jurisdiction")
                && second.is_some_and(|c| c.to_text().contains("Constituent Entities"))
        }
        TableKind::Table3 => {
            first.and_then(CellValue::as_str) == Some("S/N")
                && second.and_then(CellValue::as_str) == Some("Description")
        }
    }
}

/// Value of a `LABEL: value` line: the text after the first colon, trimmed.
/// A line without a colon has an empty value.
pub fn label_value(text: &str) -> String {
    text.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}
