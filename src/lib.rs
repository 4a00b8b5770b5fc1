//! # cbcxml
//!
//! Convert Country-by-Country Reporting spreadsheets into OECD CbC XML.
//!
//! The input is an `.xlsx` workbook following the CbC template, with sheets
//! named `Table 1`, `Table 2` and `Table 3`. The extractor reads the three
//! tables into typed records and the XML renderer maps them onto the
//! `urn:oecd:ties:cbc:v2` schema.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cbcxml::convert_file;
//!
//! let xml = convert_file("cbcr.xlsx")?;
//! std::fs::write("cbcr.xml", xml)?;
//! # Ok::<(), cbcxml::Error>(())
//! ```
//!
//! ## Step by Step
//!
//! ```no_run
//! use cbcxml::render::{to_xml, XmlOptions};
//!
//! let tables = cbcxml::extract_file("cbcr.xlsx")?;
//! for warning in &tables.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! let xml = to_xml(&tables, &XmlOptions::compact())?;
//! # Ok::<(), cbcxml::Error>(())
//! ```
//!
//! Problems confined to one table (a missing sheet, a missing header row, an
//! unparsable number) never fail a conversion; they are reported in
//! [`CbcTables::warnings`] and logged through `tracing`. Only a workbook that
//! cannot be opened at all is an [`Error`].

pub mod container;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod xlsx;

// Re-exports
pub use error::{Error, Result};
pub use extract::Extractor;
pub use model::{
    AdditionalInfoItem, CbcTables, ConstituentEntity, ExtractWarning, JurisdictionSummary,
    Table1Data, Table2Data, Table3Data, TableKind, TableMetadata,
};
pub use render::{XmlFormat, XmlOptions};
pub use xlsx::{CellValue, Sheet, XlsxReader};

use std::path::Path;

/// Extract the three CbC tables from a workbook file.
///
/// # Example
///
/// ```no_run
/// let tables = cbcxml::extract_file("cbcr.xlsx")?;
/// println!("Jurisdictions: {}", tables.table1.jurisdictions.len());
/// # Ok::<(), cbcxml::Error>(())
/// ```
pub fn extract_file(path: impl AsRef<Path>) -> Result<CbcTables> {
    let path = path.as_ref();
    let _span = tracing::info_span!("extract", path = %path.display()).entered();
    let reader = XlsxReader::open(path)?;
    Ok(Extractor::new().extract(&reader))
}

/// Extract the three CbC tables from workbook bytes.
pub fn extract_bytes(data: &[u8]) -> Result<CbcTables> {
    let _span = tracing::info_span!("extract", bytes = data.len()).entered();
    let reader = XlsxReader::from_bytes(data.to_vec())?;
    Ok(Extractor::new().extract(&reader))
}

/// Convert a workbook file to a CbC XML document.
///
/// # Example
///
/// ```no_run
/// use cbcxml::convert_file;
///
/// let xml = convert_file("cbcr.xlsx")?;
/// assert!(xml.contains("<cbc:CbcBody>"));
/// # Ok::<(), cbcxml::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>) -> Result<String> {
    convert_file_with_options(path, &XmlOptions::default())
}

/// Convert a workbook file to a CbC XML document with options.
pub fn convert_file_with_options(path: impl AsRef<Path>, options: &XmlOptions) -> Result<String> {
    let tables = extract_file(path)?;
    render::to_xml(&tables, options)
}

/// Convert workbook bytes to a CbC XML document.
///
/// # Example
///
/// ```no_run
/// use cbcxml::convert_bytes;
///
/// let data = std::fs::read("cbcr.xlsx")?;
/// let xml = convert_bytes(&data)?;
/// # Ok::<(), cbcxml::Error>(())
/// ```
pub fn convert_bytes(data: &[u8]) -> Result<String> {
    convert_bytes_with_options(data, &XmlOptions::default())
}

/// Convert workbook bytes to a CbC XML document with options.
pub fn convert_bytes_with_options(data: &[u8], options: &XmlOptions) -> Result<String> {
    let tables = extract_bytes(data)?;
    render::to_xml(&tables, options)
}
