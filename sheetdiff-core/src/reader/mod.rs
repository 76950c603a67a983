//! Excel/ODS file reader using calamine

use calamine::{Data, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub mod workbook;
pub mod xml_parser;

pub use workbook::{Cell, CellValue, Sheet, Workbook};

use crate::error::{CompareError, Result};

/// File extensions accepted as comparison inputs
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CompareError::UnsupportedFormat(source));
    }

    let mut excel = open_workbook_auto(path).map_err(|e| unparseable(&source, e))?;
    let mut sheets = load_sheets(&mut excel, &source)?;

    if matches!(excel, Sheets::Xlsx(_)) {
        let file = std::fs::File::open(path)?;
        let mut archive =
            ZipArchive::new(std::io::BufReader::new(file)).map_err(|e| unparseable(&source, e))?;
        apply_number_formats(&mut archive, &mut sheets);
    }

    tracing::info!(source = %source, sheets = sheets.len(), "read workbook");
    Ok(Workbook { source, sheets })
}

/// Read a workbook from in-memory bytes; `source` names it in messages
pub fn read_workbook_from_bytes(bytes: &[u8], source: impl Into<String>) -> Result<Workbook> {
    let source = source.into();
    let mut excel =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| unparseable(&source, e))?;
    let mut sheets = load_sheets(&mut excel, &source)?;

    if matches!(excel, Sheets::Xlsx(_)) {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| unparseable(&source, e))?;
        apply_number_formats(&mut archive, &mut sheets);
    }

    tracing::info!(source = %source, sheets = sheets.len(), "read workbook");
    Ok(Workbook { source, sheets })
}

fn unparseable(source: &str, reason: impl std::fmt::Display) -> CompareError {
    CompareError::UnparseableSource {
        source_name: source.to_string(),
        reason: reason.to_string(),
    }
}

fn load_sheets<RS: Read + Seek>(excel: &mut Sheets<RS>, source: &str) -> Result<Vec<Sheet>> {
    let mut sheets = Vec::new();

    for sheet_name in excel.sheet_names() {
        let mut sheet = Sheet::new(sheet_name.as_str());
        match excel.worksheet_range(&sheet_name) {
            Ok(range) => {
                let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
                for (row, col, data) in range.used_cells() {
                    sheet.set(
                        row_offset + row as u32,
                        col_offset + col as u32,
                        parse_cell_value(data),
                    );
                }
            }
            Err(e) => {
                // Chart sheets and similar parts carry no cell data
                tracing::warn!(source, sheet = %sheet_name, error = %e, "sheet has no readable cells");
            }
        }
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Attach number-format codes from styles.xml to the cells that use them.
///
/// Hints are best effort: a workbook whose style parts cannot be parsed is
/// still compared, only without format hints.
fn apply_number_formats(archive: &mut ZipArchive<impl Read + Seek>, sheets: &mut [Sheet]) {
    let styles = match xml_parser::parse_styles(archive) {
        Ok(styles) if !styles.is_empty() => styles,
        Ok(_) => return,
        Err(e) => {
            tracing::warn!(error = %e, "could not parse styles, comparing without format hints");
            return;
        }
    };

    let paths = match xml_parser::extract_sheet_paths_from_xlsx(archive) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve worksheet parts");
            return;
        }
    };

    for sheet in sheets.iter_mut() {
        let Some(path) = paths.get(&sheet.name) else {
            continue;
        };
        match xml_parser::extract_cell_style_indices_from_xlsx(archive, path) {
            Ok(cell_styles) => {
                for ((row, col), style_idx) in cell_styles {
                    if let Some(fmt) = styles.get(style_idx) {
                        if fmt != "General" {
                            sheet.set_num_fmt(row, col, fmt.as_str());
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(sheet = %sheet.name, error = %e, "could not read cell styles");
            }
        }
    }
}
