//! Writer module for serializing comparison reports

mod xlsx_writer;

pub use xlsx_writer::{write_xlsx, write_xlsx_bytes};

use std::fs;
use std::path::Path;

use crate::error::{CompareError, Result};
use crate::render::ReportWorkbook;

/// Serialize a report to `.xlsx` bytes
pub fn report_to_bytes(report: &ReportWorkbook) -> Result<Vec<u8>> {
    write_xlsx_bytes(report)
}

/// Write a report workbook to `path`, creating parent directories as needed
pub fn write_report<P: AsRef<Path>>(report: &ReportWorkbook, path: P) -> Result<()> {
    let path = path.as_ref();

    // Determine file type by extension
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => {}
        _ => {
            return Err(CompareError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }
    }

    let bytes = write_xlsx_bytes(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;

    tracing::info!(path = %path.display(), sheets = report.sheets.len(), "wrote report");
    Ok(())
}
