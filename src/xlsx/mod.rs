//! XLSX (Excel) workbook reading.
//!
//! Worksheets are read into a rectangular grid of typed [`CellValue`]s; no
//! numeric coercion happens at this stage.
//!
//! # Example
//!
//! ```no_run
//! use cbcxml::xlsx::XlsxReader;
//!
//! let reader = XlsxReader::open("cbcr.xlsx")?;
//! for name in reader.sheet_names() {
//!     println!("Sheet: {}", name);
//! }
//! # Ok::<(), cbcxml::Error>(())
//! ```

mod cell;
mod parser;
mod shared_strings;
mod sheet;

pub use cell::{column_index, parse_number, CellValue, MAX_COLUMNS};
pub use parser::XlsxReader;
pub use shared_strings::SharedStrings;
pub use sheet::Sheet;
