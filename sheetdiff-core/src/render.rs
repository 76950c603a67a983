//! Report renderer: turns a sheet pair into the rows of a comparison sheet

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::align::bounding_box;
use crate::classify::{ValueClass, classify, format_delta, format_value, is_percentage};
use crate::differ::compare_values;
use crate::reader::{Sheet, Workbook};
use crate::report::{CellReference, ChangeSet, ComparisonResult};

/// Prefix added to the label of every row with at least one changed value
pub const CHANGED_TAG: &str = "[CHANGED] ";

/// Suffix of generated sheet names
pub const SHEET_SUFFIX: &str = "_Comparison";

/// Longest sheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const LEGEND: [&str; 5] = [
    "Comparison Report Legend",
    "[CHANGED] marks rows where at least one value differs between the two files",
    "Original Value: the value in the original file",
    "Changed Value: the value in the modified file",
    "Difference: changed minus original, N/A when the two values are not comparable numbers",
];

const TYPE_MISMATCH: &str = "N/A (type mismatch)";
const NON_NUMERIC: &str = "N/A (non-numeric)";

/// Output layout of the comparison sheets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One cell per source cell: "Original Value: .., Changed Value: .., Difference: .."
    #[default]
    Single,
    /// Three cells per source cell: original, changed, difference
    Multi,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ReportFormat::Single),
            "multi" => Ok(ReportFormat::Multi),
            other => Err(format!(
                "unknown report format '{}' (expected 'single' or 'multi')",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Single => f.write_str("single"),
            ReportFormat::Multi => f.write_str("multi"),
        }
    }
}

/// One generated sheet of the report workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSheet {
    pub name: String,
    /// Rows of display text; the legend occupies the first rows
    pub rows: Vec<Vec<String>>,
}

impl ReportSheet {
    /// Index of the column header row
    pub fn header_row(&self) -> usize {
        LEGEND.len() + 1
    }
}

/// The report workbook handed to the writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportWorkbook {
    pub sheets: Vec<ReportSheet>,
}

/// Display text of one source cell pair
#[derive(Debug, Clone, PartialEq, Eq)]
struct PairText {
    original: String,
    modified: String,
    difference: String,
}

impl PairText {
    fn describe(original: &Sheet, modified: &Sheet, at: CellReference) -> Option<Self> {
        let a = original.value(at.row, at.col);
        let b = modified.value(at.row, at.col);
        if a.is_blank() && b.is_blank() {
            return None;
        }

        let pct_a = is_percentage(a, original.num_fmt(at.row, at.col), original, at);
        let pct_b = is_percentage(b, modified.num_fmt(at.row, at.col), modified, at);

        let difference = match (classify(a, pct_a), classify(b, pct_b)) {
            (ValueClass::Percentage(x), ValueClass::Percentage(y)) => format_delta(y - x, true),
            (ValueClass::Numeric(x), ValueClass::Numeric(y)) => format_delta(y - x, false),
            (ValueClass::Percentage(_), ValueClass::Numeric(_))
            | (ValueClass::Numeric(_), ValueClass::Percentage(_)) => TYPE_MISMATCH.to_string(),
            _ => NON_NUMERIC.to_string(),
        };

        Some(Self {
            original: format_value(a, pct_a),
            modified: format_value(b, pct_b),
            difference,
        })
    }

    fn single_cell(&self) -> String {
        format!(
            "Original Value: {}, Changed Value: {}, Difference: {}",
            self.original, self.modified, self.difference
        )
    }
}

/// Whether any non-label column of `row` differs, recomputed with the differ
pub fn row_changed(original: &Sheet, modified: &Sheet, row: u32, cols: u32) -> bool {
    (1..cols).any(|col| !compare_values(original.value(row, col), modified.value(row, col)).equal)
}

/// Render one sheet pair as rows of text: legend, blank row, header, then one
/// row per source row over the aligner's bounding box.
pub fn render_sheet(
    original: &Sheet,
    modified: &Sheet,
    change_set: &ChangeSet,
    format: ReportFormat,
) -> Vec<Vec<String>> {
    let (rows, cols) = bounding_box(original, modified);
    let mut output: Vec<Vec<String>> = LEGEND.iter().map(|line| vec![line.to_string()]).collect();
    output.push(Vec::new());
    output.push(header_row(cols, format));

    for row in 0..rows {
        let changed = row_changed(original, modified, row, cols);
        debug_assert_eq!(
            changed,
            change_set.row_changed(row),
            "row tag disagrees with change set at row {}",
            row + 1
        );

        let label = original.value(row, 0).to_string();
        let mut out_row = Vec::with_capacity(1 + cols as usize * 3);
        out_row.push(if changed {
            format!("{}{}", CHANGED_TAG, label)
        } else {
            label
        });

        for col in 1..cols {
            let pair = PairText::describe(original, modified, CellReference::new(row, col));
            match (format, pair) {
                (ReportFormat::Single, Some(pair)) => out_row.push(pair.single_cell()),
                (ReportFormat::Single, None) => out_row.push(String::new()),
                (ReportFormat::Multi, Some(pair)) => {
                    out_row.extend([pair.original, pair.modified, pair.difference])
                }
                (ReportFormat::Multi, None) => {
                    out_row.extend([String::new(), String::new(), String::new()])
                }
            }
        }

        output.push(out_row);
    }

    output
}

fn header_row(cols: u32, format: ReportFormat) -> Vec<String> {
    let mut header = vec!["Field Name".to_string()];
    for col in 1..cols {
        match format {
            ReportFormat::Single => {
                header.push(format!("Column {}", CellReference::col_to_letter(col)))
            }
            ReportFormat::Multi => header.extend(
                ["Original Value", "Changed Value", "Difference"].map(String::from),
            ),
        }
    }
    header
}

/// Name of the generated sheet for `sheet_name`, unique within `used`
pub fn report_sheet_name(sheet_name: &str, used: &mut HashSet<String>) -> String {
    let fit = |base: &str, tail: &str| -> String {
        let room = MAX_SHEET_NAME_LEN.saturating_sub(tail.chars().count());
        let base: String = base.chars().take(room).collect();
        format!("{}{}", base, tail)
    };

    let mut name = fit(sheet_name, SHEET_SUFFIX);
    let mut n = 2;
    while used.contains(&name.to_lowercase()) {
        name = fit(sheet_name, &format!("{} ({})", SHEET_SUFFIX, n));
        n += 1;
    }
    used.insert(name.to_lowercase());
    name
}

/// Render every compared sheet into the report workbook, in workbook order.
///
/// `result` must come from aligning these two workbooks, either fresh or
/// restored from its serialized form; its change sets back the row tags.
pub fn render_report(
    original: &Workbook,
    modified: &Workbook,
    result: &ComparisonResult,
    format: ReportFormat,
) -> ReportWorkbook {
    let mut used = HashSet::new();
    let mut sheets = Vec::with_capacity(result.sheets.len());

    for comparison in &result.sheets {
        let (Some(a), Some(b)) = (
            original.get_sheet(&comparison.sheet),
            modified.get_sheet(&comparison.sheet),
        ) else {
            tracing::warn!(sheet = %comparison.sheet, "sheet missing from workbook, skipped in report");
            continue;
        };

        sheets.push(ReportSheet {
            name: report_sheet_name(&comparison.sheet, &mut used),
            rows: render_sheet(a, b, &comparison.change_set, format),
        });
    }

    ReportWorkbook { sheets }
}
