//! JSON renderer for extracted tables.

use crate::error::Result;
use crate::model::CbcTables;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert extracted tables to JSON.
pub fn to_json(tables: &CbcTables, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(tables)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(tables)?,
    };
    Ok(json)
}

/// Convert extracted tables to JSON with default formatting.
pub fn to_json_default(tables: &CbcTables) -> Result<String> {
    to_json(tables, JsonFormat::Pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractWarning, JurisdictionSummary, TableKind};

    fn sample() -> CbcTables {
        let mut tables = CbcTables::default();
        tables.table1.metadata.currency = "USD".to_string();
        tables.table1.jurisdictions.push(JurisdictionSummary {
            tax_jurisdiction: "Country X".to_string(),
            total_revenue: 150,
            ..Default::default()
        });
        tables.warnings.push(ExtractWarning::MissingSheet {
            table: TableKind::Table3,
        });
        tables
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"taxJurisdiction\": \"Country X\""));
        assert!(json.contains("\"currency\": \"USD\""));
        assert!(json.contains("\"kind\": \"missingSheet\""));
        assert!(json.contains("\"table\": \"table3\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"totalRevenue\":150"));
    }

    #[test]
    fn test_to_json_default() {
        let json = to_json_default(&CbcTables::default()).unwrap();
        assert!(json.contains('\n'));
        assert!(!json.contains("warnings"));
    }

    #[test]
    fn test_tables_roundtrip() {
        let tables = sample();
        let json = to_json_default(&tables).unwrap();
        let parsed: CbcTables = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tables);
    }
}
