//! Structure validation gate run before any cell is compared

use crate::error::{CompareError, Result};
use crate::reader::Workbook;

/// Check that both workbooks have the same sheets in the same order.
///
/// Sheet names are compared by position, so reordered sheets fail even when
/// the name sets match. Only the first violation is reported.
pub fn validate_structure(original: &Workbook, modified: &Workbook) -> Result<()> {
    if original.sheets.len() != modified.sheets.len() {
        return Err(CompareError::SheetCountMismatch {
            original: original.sheets.len(),
            modified: modified.sheets.len(),
        });
    }

    let mismatch = original
        .sheets
        .iter()
        .zip(&modified.sheets)
        .enumerate()
        .find(|(_, (a, b))| a.name != b.name);

    if let Some((index, (a, b))) = mismatch {
        return Err(CompareError::SheetNameMismatch {
            position: index + 1,
            original: a.name.clone(),
            modified: b.name.clone(),
        });
    }

    Ok(())
}
