//! Error types for the cbcxml library.

use std::io;
use thiserror::Error;

/// Result type alias for cbcxml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion.
///
/// Problems confined to a single table (missing sheet, missing data header,
/// unparsable cell) are not errors; they are recorded as
/// [`ExtractWarning`](crate::model::ExtractWarning)s and the table degrades
/// to an empty result.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a ZIP-based Office package.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The input is an Office package, but not a spreadsheet.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The workbook could not be opened at all.
    #[error("Unreadable workbook: {0}")]
    UnreadableWorkbook(String),

    /// Error while producing output.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}
