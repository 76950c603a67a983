//! Cell differ: decides whether an original/modified value pair is the same

use serde::{Deserialize, Serialize};

use crate::classify::{EPSILON, percentage_equivalent, tolerant_numeric};
use crate::reader::CellValue;
use crate::report::CellReference;

/// How a pair of values was compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaKind {
    Numeric,
    Percentage,
    TypeMismatch,
    NonNumeric,
}

/// Verdict for one cell pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDiff {
    pub equal: bool,
    /// `modified - original` when both sides were compared as numbers
    pub numeric_delta: Option<f64>,
    pub kind: DeltaKind,
}

impl CellDiff {
    fn numeric(kind: DeltaKind, original: f64, modified: f64) -> Self {
        let delta = modified - original;
        Self {
            equal: delta.abs() <= EPSILON,
            numeric_delta: Some(delta),
            kind,
        }
    }
}

/// Compare two raw values.
///
/// Total over all inputs: identical values are equal; numbers and numeric
/// text compare within [`EPSILON`]; then percentage equivalents (fractions in
/// `[0, 1]` against `%` text) compare within [`EPSILON`]; anything else
/// compares as trimmed text.
pub fn compare_values(original: &CellValue, modified: &CellValue) -> CellDiff {
    if original == modified {
        return match original {
            CellValue::Number(_) => CellDiff {
                equal: true,
                numeric_delta: Some(0.0),
                kind: DeltaKind::Numeric,
            },
            _ => CellDiff {
                equal: true,
                numeric_delta: None,
                kind: DeltaKind::NonNumeric,
            },
        };
    }

    if let (Some(a), Some(b)) = (tolerant_numeric(original), tolerant_numeric(modified)) {
        return CellDiff::numeric(DeltaKind::Numeric, a, b);
    }

    if let (Some(a), Some(b)) = (percentage_equivalent(original), percentage_equivalent(modified))
    {
        return CellDiff::numeric(DeltaKind::Percentage, a, b);
    }

    let equal = original.to_string().trim() == modified.to_string().trim();
    let kind = if (is_percent_text(original) && tolerant_numeric(modified).is_some())
        || (is_percent_text(modified) && tolerant_numeric(original).is_some())
    {
        DeltaKind::TypeMismatch
    } else {
        DeltaKind::NonNumeric
    };

    CellDiff {
        equal,
        numeric_delta: None,
        kind,
    }
}

/// Compare two cells of the named sheet. Format hints are logged, equality
/// ignores them.
pub fn compare_cells(
    original: &CellValue,
    modified: &CellValue,
    original_num_fmt: Option<&str>,
    modified_num_fmt: Option<&str>,
    sheet: &str,
    at: CellReference,
) -> CellDiff {
    let diff = compare_values(original, modified);
    if !diff.equal {
        tracing::trace!(
            sheet,
            cell = %at,
            ?original_num_fmt,
            ?modified_num_fmt,
            kind = ?diff.kind,
            "cell differs"
        );
    }
    diff
}

fn is_percent_text(value: &CellValue) -> bool {
    percentage_equivalent(value).is_some() && matches!(value, CellValue::Text(_))
}
