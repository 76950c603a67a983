//! Comparison results: difference records, change sets and run summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::reader::CellValue;

/// Cell reference (e.g., A1, B2), zero-based internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row + 1)
    }

    /// Parse an Excel-style reference ("B3", "$AA$10") into zero-based indices
    pub fn parse(cell_ref: &str) -> Option<Self> {
        let cell_ref = cell_ref.trim().replace('$', "");
        let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cell_ref.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col = 0u32;
        for ch in letters.chars() {
            col = col
                .checked_mul(26)?
                .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
        }
        let row = digits.parse::<u32>().ok().filter(|r| *r > 0)?;

        Some(Self::new(row - 1, col - 1))
    }

    /// Convert column number to letter (0 -> A, 1 -> B, 26 -> AA)
    pub fn col_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl PartialOrd for CellReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl std::fmt::Display for CellReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// One cell whose original and modified values differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    pub sheet: String,
    /// 1-based row
    pub row: u32,
    /// 1-based column
    pub col: u32,
    pub cell_ref: String,
    pub original_value: String,
    pub modified_value: String,
}

impl DifferenceRecord {
    pub fn new(
        sheet: impl Into<String>,
        at: CellReference,
        original: &CellValue,
        modified: &CellValue,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            row: at.row + 1,
            col: at.col + 1,
            cell_ref: at.to_excel_ref(),
            original_value: original.to_string(),
            modified_value: modified.to_string(),
        }
    }
}

/// Zero-based coordinates of changed cells in one sheet, label column excluded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    cells: BTreeSet<(u32, u32)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed coordinate; column 0 is the label column and is ignored
    pub fn insert(&mut self, row: u32, col: u32) -> bool {
        col >= 1 && self.cells.insert((row, col))
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.cells.contains(&(row, col))
    }

    /// Whether any non-label column of the row changed
    pub fn row_changed(&self, row: u32) -> bool {
        self.cells.range((row, 0)..=(row, u32::MAX)).next().is_some()
    }

    /// Rows with at least one changed non-label column, ascending
    pub fn changed_rows(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self.cells.iter().map(|(r, _)| *r).collect();
        rows.dedup();
        rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.cells.iter()
    }
}

/// Alignment output for one sheet pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetComparison {
    pub sheet: String,
    /// Bounding box scanned, (rows, cols)
    pub dimensions: (u32, u32),
    pub differences: Vec<DifferenceRecord>,
    #[serde(default)]
    pub change_set: ChangeSet,
}

/// Aggregate result of one comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Identifier of the original workbook
    pub original: String,
    /// Identifier of the modified workbook
    pub modified: String,
    pub timestamp: DateTime<Utc>,
    pub sheets: Vec<SheetComparison>,
}

impl ComparisonResult {
    /// All difference records, in sheet order then row-major order
    pub fn differences(&self) -> impl Iterator<Item = &DifferenceRecord> {
        self.sheets.iter().flat_map(|s| s.differences.iter())
    }

    pub fn total_differences(&self) -> usize {
        self.sheets.iter().map(|s| s.differences.len()).sum()
    }

    pub fn sheets_compared(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets_with_differences(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| !s.differences.is_empty())
            .count()
    }

    pub fn has_differences(&self) -> bool {
        self.sheets.iter().any(|s| !s.differences.is_empty())
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetComparison> {
        self.sheets.iter().find(|s| s.sheet == name)
    }

    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary {
            original: self.original.clone(),
            modified: self.modified.clone(),
            timestamp: self.timestamp,
            total_differences: self.total_differences(),
            sheets_compared: self.sheets_compared(),
            sheets_with_differences: self.sheets_with_differences(),
            sheets: self
                .sheets
                .iter()
                .map(|s| SheetSummary {
                    sheet: s.sheet.clone(),
                    rows: s.dimensions.0,
                    cols: s.dimensions.1,
                    differences: s.differences.len(),
                    changed_rows: s.change_set.changed_rows().len(),
                })
                .collect(),
        }
    }
}

/// Summary statistics of a comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub original: String,
    pub modified: String,
    pub timestamp: DateTime<Utc>,
    pub total_differences: usize,
    pub sheets_compared: usize,
    pub sheets_with_differences: usize,
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub rows: u32,
    pub cols: u32,
    pub differences: usize,
    pub changed_rows: usize,
}
