//! Record sets extracted from the three CbC report tables.

use super::ExtractWarning;
use serde::{Deserialize, Serialize};

/// Which of the three CbC report tables a record or warning belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableKind {
    /// Overview of allocation of income, taxes and business activities
    Table1,
    /// Constituent entities and their main business activities
    Table2,
    /// Additional information
    Table3,
}

impl TableKind {
    /// The exact sheet name the template uses for this table.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            TableKind::Table1 => "Table 1",
            TableKind::Table2 => "Table 2",
            TableKind::Table3 => "Table 3",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Metadata lines captured from the top of a table sheet.
///
/// Each field holds the text after the first colon of its labelled line;
/// `table_title` holds the whole title line. `currency` is only ever read
/// from Table 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub table_title: String,
    pub mne_group: String,
    pub fiscal_year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
}

/// One Table 1 row: the financial summary of a tax jurisdiction.
///
/// `total_revenue` is taken from the sheet as-is and never recomputed from
/// the unrelated/related split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionSummary {
    pub tax_jurisdiction: String,
    pub unrelated_revenue: i64,
    pub related_revenue: i64,
    pub total_revenue: i64,
    pub profit_loss: i64,
    pub tax_paid: i64,
    pub tax_accrued: i64,
    pub capital: i64,
    pub earnings: i64,
    pub employees: i64,
    pub tangible_assets: i64,
}

/// One Table 2 row: a constituent entity with its business activities in
/// sheet column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituentEntity {
    pub tax_jurisdiction: String,
    pub entity_name: String,
    pub activities: Vec<String>,
}

/// One Table 3 row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfoItem {
    /// Serial number as written; not necessarily numeric
    pub sn: String,
    pub description: String,
}

impl AdditionalInfoItem {
    /// Text used for the `OtherInfo` element: `"{sn}. {description}"`.
    pub fn other_info(&self) -> String {
        format!("{}. {}", self.sn, self.description)
    }
}

/// Extracted Table 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table1Data {
    /// Verbatim header lines in sheet order
    pub headers: Vec<String>,
    pub metadata: TableMetadata,
    pub jurisdictions: Vec<JurisdictionSummary>,
}

/// Extracted Table 2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table2Data {
    pub headers: Vec<String>,
    pub metadata: TableMetadata,
    pub entities: Vec<ConstituentEntity>,
}

/// Extracted Table 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table3Data {
    pub headers: Vec<String>,
    pub metadata: TableMetadata,
    pub additional_info: Vec<AdditionalInfoItem>,
}

impl Table3Data {
    /// Table 3 is only reported when it has a header line or an item.
    pub fn has_content(&self) -> bool {
        !self.headers.is_empty() || !self.additional_info.is_empty()
    }
}

/// Everything extracted from one workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbcTables {
    pub table1: Table1Data,
    pub table2: Table2Data,
    pub table3: Table3Data,
    /// Non-fatal problems met during extraction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractWarning>,
}

impl CbcTables {
    /// Currency code shared by every monetary amount in the report.
    pub fn currency(&self) -> &str {
        &self.table1.metadata.currency
    }

    /// Table 2 entities belonging to `jurisdiction`, by exact name, in
    /// Table 2 order.
    pub fn entities_for<'a>(
        &'a self,
        jurisdiction: &'a str,
    ) -> impl Iterator<Item = &'a ConstituentEntity> + 'a {
        self.table2
            .entities
            .iter()
            .filter(move |e| e.tax_jurisdiction == jurisdiction)
    }

    /// Table 2 entities whose jurisdiction has no Table 1 row. These are
    /// left out of the generated report.
    pub fn orphan_entities(&self) -> Vec<&ConstituentEntity> {
        self.table2
            .entities
            .iter()
            .filter(|e| {
                !self
                    .table1
                    .jurisdictions
                    .iter()
                    .any(|j| j.tax_jurisdiction == e.tax_jurisdiction)
            })
            .collect()
    }
}
