//! Configuration for comparison runs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CompareError, Result};
use crate::render::ReportFormat;

/// File looked up in the working directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "sheetdiff.toml";

/// Main comparison configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    /// Report layout
    #[serde(default)]
    pub format: ReportFormat,
    /// Align sheets on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Directory the report is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report file name; dated default when absent
    #[serde(default)]
    pub output_name: Option<String>,
}

fn default_parallel() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            parallel: default_parallel(),
            output_dir: default_output_dir(),
            output_name: None,
        }
    }
}

impl CompareConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CompareError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| CompareError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CompareError::Config(e.to_string()))
    }

    /// Load `sheetdiff.toml` from `dir` if present, defaults otherwise
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Where the report for a run on `date` is written
    pub fn output_path(&self, date: NaiveDate) -> PathBuf {
        let name = self
            .output_name
            .clone()
            .unwrap_or_else(|| default_report_file_name(date));
        self.output_dir.join(name)
    }
}

/// `comparison_report_{YYYY-MM-DD}.xlsx`
pub fn default_report_file_name(date: NaiveDate) -> String {
    format!("comparison_report_{}.xlsx", date.format("%Y-%m-%d"))
}
