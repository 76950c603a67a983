//! Sheet aligner: full row-major scan of two sheets over a shared bounding box

use rayon::prelude::*;

use crate::differ::compare_cells;
use crate::reader::{Sheet, Workbook};
use crate::report::{CellReference, ChangeSet, DifferenceRecord, SheetComparison};

/// Bounding box covering both sheets, (rows, cols)
pub fn bounding_box(original: &Sheet, modified: &Sheet) -> (u32, u32) {
    let (rows_a, cols_a) = original.dimensions();
    let (rows_b, cols_b) = modified.dimensions();
    (rows_a.max(rows_b), cols_a.max(cols_b))
}

/// Compare every coordinate of the bounding box.
///
/// No early exit: the whole box is always scanned so the record list is
/// complete. Records come out in ascending row, then ascending column order.
pub fn align_sheets(original: &Sheet, modified: &Sheet, sheet_name: &str) -> SheetComparison {
    let (rows, cols) = bounding_box(original, modified);
    let mut differences = Vec::new();
    let mut change_set = ChangeSet::new();

    for row in 0..rows {
        for col in 0..cols {
            let at = CellReference::new(row, col);
            let a = original.value(row, col);
            let b = modified.value(row, col);
            let diff = compare_cells(
                a,
                b,
                original.num_fmt(row, col),
                modified.num_fmt(row, col),
                sheet_name,
                at,
            );

            if !diff.equal {
                differences.push(DifferenceRecord::new(sheet_name, at, a, b));
                change_set.insert(row, col);
            }
        }
    }

    tracing::debug!(
        sheet = sheet_name,
        rows,
        cols,
        differences = differences.len(),
        "aligned sheet"
    );

    SheetComparison {
        sheet: sheet_name.to_string(),
        dimensions: (rows, cols),
        differences,
        change_set,
    }
}

/// Align every sheet pair in workbook order.
///
/// Both workbooks must already have passed structure validation, so sheets
/// pair up by position. With `parallel` the sheets are scanned on the rayon
/// pool; the output order is the workbook order either way.
pub fn align_workbooks(
    original: &Workbook,
    modified: &Workbook,
    parallel: bool,
) -> Vec<SheetComparison> {
    let pairs: Vec<(&Sheet, &Sheet)> = original.sheets.iter().zip(&modified.sheets).collect();

    if parallel {
        pairs
            .par_iter()
            .map(|(a, b)| align_sheets(a, b, &a.name))
            .collect()
    } else {
        pairs
            .iter()
            .map(|(a, b)| align_sheets(a, b, &a.name))
            .collect()
    }
}
