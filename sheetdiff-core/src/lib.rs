//! sheetdiff-core: Core library for cell-by-cell workbook comparison
//!
//! Two workbooks with the same sheet structure are aligned cell by cell,
//! numeric and percentage differences are quantified, and the result is
//! rendered into a report workbook.

pub mod align;
pub mod classify;
pub mod config;
pub mod differ;
pub mod error;
pub mod reader;
pub mod render;
pub mod report;
pub mod validate;
pub mod writer;

use chrono::Utc;
use std::path::{Path, PathBuf};

pub use config::{CompareConfig, default_report_file_name};
pub use error::{CompareError, Result};
pub use reader::{Cell, CellValue, Sheet, Workbook};
pub use render::{ReportFormat, ReportSheet, ReportWorkbook};
pub use report::{
    CellReference, ChangeSet, ComparisonResult, ComparisonSummary, DifferenceRecord,
    SheetComparison, SheetSummary,
};

/// Result of a full comparison run
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub result: ComparisonResult,
    /// Where the report was written
    pub report_path: PathBuf,
}

/// Main comparison interface
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    /// Create a new comparator with default configuration
    pub fn new() -> Self {
        Self::with_config(CompareConfig::default())
    }

    /// Create a new comparator with custom configuration
    pub fn with_config(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Validate structure and align every sheet pair.
    ///
    /// Fails before any cell is compared when the sheet lists differ.
    pub fn compare_workbooks(
        &self,
        original: &Workbook,
        modified: &Workbook,
    ) -> Result<ComparisonResult> {
        validate::validate_structure(original, modified)?;

        let sheets = align::align_workbooks(original, modified, self.config.parallel);
        let result = ComparisonResult {
            original: original.source.clone(),
            modified: modified.source.clone(),
            timestamp: Utc::now(),
            sheets,
        };

        tracing::info!(
            original = %result.original,
            modified = %result.modified,
            sheets = result.sheets_compared(),
            differences = result.total_differences(),
            "comparison finished"
        );
        Ok(result)
    }

    /// Read both files and compare them; the decoded workbooks are returned
    /// alongside the result for rendering
    pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        original: P,
        modified: Q,
    ) -> Result<(Workbook, Workbook, ComparisonResult)> {
        let original = reader::read_workbook(original)?;
        let modified = reader::read_workbook(modified)?;
        let result = self.compare_workbooks(&original, &modified)?;
        Ok((original, modified, result))
    }

    /// Render a comparison into a report workbook using the configured layout
    pub fn render(
        &self,
        original: &Workbook,
        modified: &Workbook,
        result: &ComparisonResult,
    ) -> ReportWorkbook {
        render::render_report(original, modified, result, self.config.format)
    }

    /// Read, validate, align, render and write as one unit.
    ///
    /// `output` overrides the configured report location. Nothing is written
    /// when the comparison fails.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        original: P,
        modified: Q,
        output: Option<&Path>,
    ) -> Result<ComparisonOutcome> {
        let (original, modified, result) = self.compare_files(original, modified)?;
        let report = self.render(&original, &modified, &result);

        let report_path = match output {
            Some(path) => path.to_path_buf(),
            None => self
                .config
                .output_path(result.timestamp.with_timezone(&chrono::Local).date_naive()),
        };
        writer::write_report(&report, &report_path)?;

        Ok(ComparisonOutcome {
            result,
            report_path,
        })
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}
