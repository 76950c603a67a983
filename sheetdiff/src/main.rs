use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetdiff_core::config::DEFAULT_CONFIG_FILE;
use sheetdiff_core::{CompareConfig, Comparator, ComparisonResult, ReportFormat};
use std::path::PathBuf;
use std::process::ExitCode;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetdiff")]
#[command(about = "Cell-by-cell comparison of two Excel/ODS workbooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the original workbook
    #[arg(value_name = "ORIGINAL")]
    original: PathBuf,

    /// Path to the modified workbook
    #[arg(value_name = "MODIFIED")]
    modified: PathBuf,

    /// Where to write the report (default: comparison_report_{date}.xlsx)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Report layout
    #[arg(short, long, value_enum)]
    format: Option<LayoutArg>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Summary printed to stdout
    #[arg(long, value_enum, default_value = "human")]
    summary: SummaryFormat,

    /// Compare only, do not write a report workbook
    #[arg(long)]
    no_report: bool,

    /// Compare sheets one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// One cell per compared value
    Single,
    /// Original, changed and difference in separate cells
    Multi,
}

impl From<LayoutArg> for ReportFormat {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Single => ReportFormat::Single,
            LayoutArg::Multi => ReportFormat::Multi,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for CI/CD integration
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(result) if result.has_differences() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<CompareConfig> {
    let mut config = match &cli.config {
        Some(config_path) => CompareConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?,
        None => CompareConfig::discover(".")
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_FILE))?,
    };

    // Command line flags override the file
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if cli.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<ComparisonResult> {
    let config = load_config(cli)?;
    let comparator = Comparator::with_config(config);

    let (result, report_path) = if cli.no_report {
        let (_, _, result) = comparator
            .compare_files(&cli.original, &cli.modified)
            .with_context(|| {
                format!(
                    "Failed to compare {} with {}",
                    cli.original.display(),
                    cli.modified.display()
                )
            })?;
        (result, None)
    } else {
        let outcome = comparator
            .run(&cli.original, &cli.modified, cli.output.as_deref())
            .with_context(|| {
                format!(
                    "Failed to compare {} with {}",
                    cli.original.display(),
                    cli.modified.display()
                )
            })?;
        (outcome.result, Some(outcome.report_path))
    };

    match cli.summary {
        SummaryFormat::Human => formatter::print_human(&result, report_path.as_deref()),
        SummaryFormat::Json => formatter::print_json(&result, report_path.as_deref())?,
    }

    Ok(result)
}
