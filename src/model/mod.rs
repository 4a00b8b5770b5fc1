//! Data model for an extracted CbC report.
//!
//! The extractor fills these structures from the workbook and the renderers
//! turn them into XML or JSON. Nothing here refers back to the workbook.

mod tables;
mod warning;

pub use tables::*;
pub use warning::*;
