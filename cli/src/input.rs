//! Checks applied to an input workbook before conversion.

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default upper bound on the input size.
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;

/// Why an input file was refused.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Legacy .xls workbooks are not supported; save the file as .xlsx")]
    LegacyXls,

    #[error("Only Excel files (.xlsx) are allowed, got '{0}'")]
    WrongExtension(String),

    #[error(
        "File size too large ({:.1} MB). Maximum size is {limit_mb} MB",
        megabytes(.size)
    )]
    TooLarge { size: u64, limit_mb: u64 },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Check extension and size of the workbook at `path`.
pub fn validate(path: &Path, max_size_mb: u64) -> Result<(), InputError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" => {}
        "xls" => return Err(InputError::LegacyXls),
        other => return Err(InputError::WrongExtension(other.to_string())),
    }

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => InputError::NotFound(path.display().to_string()),
        _ => InputError::Io(e),
    })?;

    let limit = max_size_mb.saturating_mul(1024 * 1024);
    if metadata.len() > limit {
        return Err(InputError::TooLarge {
            size: metadata.len(),
            limit_mb: max_size_mb,
        });
    }

    Ok(())
}
