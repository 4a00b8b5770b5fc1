//! Output rendering for extracted tables.
//!
//! The XML renderer produces the OECD CbC report; the JSON renderer dumps
//! the extracted records for inspection.
//!
//! # Example
//!
//! ```no_run
//! use cbcxml::{extract_file, render::*};
//!
//! let tables = extract_file("cbcr.xlsx")?;
//!
//! // CbC XML report
//! let xml = to_xml(&tables, &XmlOptions::default())?;
//!
//! // Extracted records as JSON
//! let json = to_json(&tables, JsonFormat::Pretty)?;
//! # Ok::<(), cbcxml::Error>(())
//! ```

mod json;
mod options;
mod xml;

pub use json::{to_json, to_json_default, JsonFormat};
pub use options::{XmlFormat, XmlOptions};
pub use xml::{
    to_xml, to_xml_default, CBC_NAMESPACE, ISO_NAMESPACE, SCHEMA_VERSION, STF_NAMESPACE,
};
