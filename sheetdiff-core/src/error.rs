//! Error taxonomy for comparison runs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

/// Errors surfaced by the comparison pipeline.
///
/// Structural mismatches are fatal: no partial report is produced.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(
        "Structural mismatch: original workbook has {original} sheet(s), modified workbook has {modified}"
    )]
    SheetCountMismatch { original: usize, modified: usize },

    #[error(
        "Structural mismatch: sheet {position} is named '{original}' in the original workbook but '{modified}' in the modified workbook"
    )]
    SheetNameMismatch {
        /// 1-based sheet position
        position: usize,
        original: String,
        modified: String,
    },

    #[error("Failed to read workbook '{source_name}': {reason}")]
    UnparseableSource { source_name: String, reason: String },

    #[error("Unsupported file format: {0} (expected .xlsx, .xlsm, .xls, .xlsb or .ods)")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report has no sheets to write")]
    EmptyReport,

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompareError {
    /// Whether this error is a structural mismatch between the two workbooks
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CompareError::SheetCountMismatch { .. } | CompareError::SheetNameMismatch { .. }
        )
    }
}
