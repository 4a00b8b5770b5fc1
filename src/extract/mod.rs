//! Spreadsheet extraction for the three CbC report tables.
//!
//! For every table the extractor:
//!
//! 1. scans all lines for the title, MNE group, fiscal year and (Table 1)
//!    currency labels, keeping each matched line verbatim as a header;
//! 2. finds the column header row that starts the data;
//! 3. reads the rows below it into records.
//!
//! # Example
//!
//! ```no_run
//! use cbcxml::extract::Extractor;
//! use cbcxml::xlsx::XlsxReader;
//!
//! let reader = XlsxReader::open("cbcr.xlsx")?;
//! let tables = Extractor::new().extract(&reader);
//! for warning in &tables.warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok::<(), cbcxml::Error>(())
//! ```

mod classify;
mod extractor;

pub use classify::{classify_line, is_data_header, label_value, row_text, title_marker, LineKind};
pub use extractor::Extractor;
