//! Table extraction from the CbC template sheets.

use super::classify::{classify_line, is_data_header, label_value, row_text, LineKind};
use crate::error::Error;
use crate::model::{
    AdditionalInfoItem, CbcTables, ConstituentEntity, ExtractWarning, JurisdictionSummary,
    Table1Data, Table2Data, Table3Data, TableKind, TableMetadata,
};
use crate::xlsx::{CellValue, Sheet, XlsxReader};

static EMPTY: CellValue = CellValue::Empty;

/// Activity labels start at this column in the Table 2 label row.
const FIRST_ACTIVITY_COLUMN: usize = 3;

/// Cell that marks an activity as carried on by an entity.
const ACTIVITY_MARKER: &str = "X";

fn cell(row: &[CellValue], column: usize) -> &CellValue {
    row.get(column).unwrap_or(&EMPTY)
}

fn trimmed(row: &[CellValue], column: usize) -> String {
    cell(row, column).to_text().trim().to_string()
}

/// An activity column from the Table 2 label row.
#[derive(Debug, Clone)]
struct ActivityColumn {
    index: usize,
    label: String,
}

/// Extracts the three CbC tables and collects the warnings met on the way.
///
/// Each table is handled on its own: a missing or unreadable sheet leaves
/// that table empty and never affects the others.
#[derive(Debug, Default)]
pub struct Extractor {
    warnings: Vec<ExtractWarning>,
}

impl Extractor {
    /// Create an extractor with no recorded warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract all three tables from a workbook.
    pub fn extract(mut self, reader: &XlsxReader) -> CbcTables {
        let table1 = self.read_table(reader, TableKind::Table1, Self::table1);
        let table2 = self.read_table(reader, TableKind::Table2, Self::table2);
        let table3 = self.read_table(reader, TableKind::Table3, Self::table3);
        self.finish(table1, table2, table3)
    }

    /// Extract all three tables from already loaded sheets.
    pub fn extract_sheets(
        mut self,
        table1: Option<&Sheet>,
        table2: Option<&Sheet>,
        table3: Option<&Sheet>,
    ) -> CbcTables {
        let table1 = self.table1(table1);
        let table2 = self.table2(table2);
        let table3 = self.table3(table3);
        self.finish(table1, table2, table3)
    }

    fn finish(self, table1: Table1Data, table2: Table2Data, table3: Table3Data) -> CbcTables {
        tracing::info!(
            jurisdictions = table1.jurisdictions.len(),
            entities = table2.entities.len(),
            additional_info = table3.additional_info.len(),
            warnings = self.warnings.len(),
            "extracted CbC tables"
        );

        CbcTables {
            table1,
            table2,
            table3,
            warnings: self.warnings,
        }
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    fn warn(&mut self, warning: ExtractWarning) {
        tracing::warn!(table = %warning.table(), "{}", warning);
        self.warnings.push(warning);
    }

    /// Load a table's sheet and run `extract` on it. A sheet that exists but
    /// cannot be read degrades to the table's empty result.
    fn read_table<T: Default>(
        &mut self,
        reader: &XlsxReader,
        table: TableKind,
        extract: fn(&mut Self, Option<&Sheet>) -> T,
    ) -> T {
        match reader.sheet(table.sheet_name()) {
            Ok(sheet) => extract(self, sheet.as_ref()),
            Err(e) => {
                self.table_failed(table, &e);
                T::default()
            }
        }
    }

    fn table_failed(&mut self, table: TableKind, error: &Error) {
        self.warn(ExtractWarning::TableFailed {
            table,
            reason: error.to_string(),
        });
    }

    /// Collect header lines and metadata from every row of the sheet.
    ///
    /// Later matches overwrite earlier ones.
    fn scan_metadata(table: TableKind, sheet: &Sheet) -> (Vec<String>, TableMetadata) {
        let mut headers = Vec::new();
        let mut metadata = TableMetadata::default();

        for row in sheet.rows() {
            let text = row_text(row);
            let kind = classify_line(table, &text, row);
            match kind {
                LineKind::Title => metadata.table_title = text.clone(),
                LineKind::MneGroup => metadata.mne_group = label_value(&text),
                LineKind::FiscalYear => metadata.fiscal_year = label_value(&text),
                LineKind::Currency => metadata.currency = label_value(&text),
                LineKind::DataHeader | LineKind::Unrecognized => {}
            }
            if kind.is_header_line() {
                headers.push(text);
            }
        }

        tracing::debug!(table = %table, headers = headers.len(), "scanned metadata lines");
        (headers, metadata)
    }

    /// Index of the first data header row, recording a warning if absent.
    fn find_data_header(&mut self, table: TableKind, sheet: &Sheet) -> Option<usize> {
        let found = sheet
            .rows()
            .iter()
            .position(|row| is_data_header(table, row));

        if found.is_none() {
            self.warn(ExtractWarning::MissingDataHeaderRow { table });
        }
        found
    }

    fn number(
        &mut self,
        table: TableKind,
        row: &[CellValue],
        row_index: usize,
        column: usize,
    ) -> i64 {
        let value = cell(row, column);
        if value.is_malformed_number() {
            self.warn(ExtractWarning::MalformedCell {
                table,
                row: row_index,
                column,
                value: value.to_text(),
            });
        }
        value.parse_number()
    }

    /// Extract Table 1: one jurisdiction summary per row below the header.
    pub fn table1(&mut self, sheet: Option<&Sheet>) -> Table1Data {
        let table = TableKind::Table1;
        let Some(sheet) = sheet else {
            self.warn(ExtractWarning::MissingSheet { table });
            return Table1Data::default();
        };

        let (headers, metadata) = Self::scan_metadata(table, sheet);
        let mut data = Table1Data {
            headers,
            metadata,
            jurisdictions: Vec::new(),
        };

        let Some(start) = self.find_data_header(table, sheet) else {
            return data;
        };

        for (idx, row) in sheet.rows().iter().enumerate().skip(start + 1) {
            if cell(row, 0).is_empty() {
                continue;
            }

            data.jurisdictions.push(JurisdictionSummary {
                tax_jurisdiction: trimmed(row, 0),
                unrelated_revenue: self.number(table, row, idx, 1),
                related_revenue: self.number(table, row, idx, 2),
                total_revenue: self.number(table, row, idx, 3),
                profit_loss: self.number(table, row, idx, 4),
                tax_paid: self.number(table, row, idx, 5),
                tax_accrued: self.number(table, row, idx, 6),
                capital: self.number(table, row, idx, 7),
                earnings: self.number(table, row, idx, 8),
                employees: self.number(table, row, idx, 9),
                tangible_assets: self.number(table, row, idx, 10),
            });
        }

        tracing::debug!(table = %table, count = data.jurisdictions.len(), "read jurisdictions");
        data
    }

    /// Extract Table 2: constituent entities and their marked activities.
    ///
    /// The row right after the header row names the activities, starting at
    /// the fourth column; an entity carries an activity when its cell in that
    /// column is exactly `X`.
    pub fn table2(&mut self, sheet: Option<&Sheet>) -> Table2Data {
        let table = TableKind::Table2;
        let Some(sheet) = sheet else {
            self.warn(ExtractWarning::MissingSheet { table });
            return Table2Data::default();
        };

        let (headers, metadata) = Self::scan_metadata(table, sheet);
        let mut data = Table2Data {
            headers,
            metadata,
            entities: Vec::new(),
        };

        let Some(start) = self.find_data_header(table, sheet) else {
            return data;
        };

        let Some(label_row) = sheet.row(start + 1) else {
            self.warn(ExtractWarning::MissingActivityRow { table });
            return data;
        };

        let activities: Vec<ActivityColumn> = label_row
            .iter()
            .enumerate()
            .skip(FIRST_ACTIVITY_COLUMN)
            .filter_map(|(index, value)| {
                let label = value.to_text().trim().to_string();
                (!label.is_empty()).then_some(ActivityColumn { index, label })
            })
            .collect();

        tracing::debug!(table = %table, activities = activities.len(), "read activity labels");

        for row in sheet.rows().iter().skip(start + 2) {
            if cell(row, 0).is_empty() {
                continue;
            }

            let tax_jurisdiction = trimmed(row, 0);
            if tax_jurisdiction.is_empty() {
                continue;
            }

            let marked = activities
                .iter()
                .filter(|a| cell(row, a.index).as_str() == Some(ACTIVITY_MARKER))
                .map(|a| a.label.clone())
                .collect();

            data.entities.push(ConstituentEntity {
                tax_jurisdiction,
                entity_name: trimmed(row, 1),
                activities: marked,
            });
        }

        tracing::debug!(table = %table, count = data.entities.len(), "read constituent entities");
        data
    }

    /// Extract Table 3: serial-numbered free-text items.
    pub fn table3(&mut self, sheet: Option<&Sheet>) -> Table3Data {
        let table = TableKind::Table3;
        let Some(sheet) = sheet else {
            self.warn(ExtractWarning::MissingSheet { table });
            return Table3Data::default();
        };

        let (headers, metadata) = Self::scan_metadata(table, sheet);
        let mut data = Table3Data {
            headers,
            metadata,
            additional_info: Vec::new(),
        };

        let Some(start) = self.find_data_header(table, sheet) else {
            return data;
        };

        data.additional_info = sheet
            .rows()
            .iter()
            .skip(start + 1)
            .filter(|row| !cell(row, 0).is_empty() || !cell(row, 1).is_empty())
            .map(|row| AdditionalInfoItem {
                sn: trimmed(row, 0),
                description: trimmed(row, 1),
            })
            .collect();

        tracing::debug!(table = %table, count = data.additional_info.len(), "read additional info");
        data
    }
}
