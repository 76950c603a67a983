//! Output formatters for comparison results

use anyhow::Result;
use colored::*;
use sheetdiff_core::ComparisonResult;
use std::path::Path;

/// Print the comparison in human-readable format, grouped by sheet
pub fn print_human(result: &ComparisonResult, report_path: Option<&Path>) {
    println!(
        "{}",
        format!("Comparing: {} -> {}", result.original, result.modified).bold()
    );
    println!();

    if !result.has_differences() {
        println!("{}", "✓ No differences found!".green().bold());
    }

    for sheet in result.sheets.iter().filter(|s| !s.differences.is_empty()) {
        println!("{} {}", "Sheet:".bold(), sheet.sheet.cyan().bold());
        for diff in &sheet.differences {
            println!(
                "  {} {} {} {}",
                format!("{:>6}", diff.cell_ref).yellow(),
                display_or_blank(&diff.original_value).red(),
                "->".bright_black(),
                display_or_blank(&diff.modified_value).green()
            );
        }
        println!();
    }

    let summary = result.summary();
    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Sheets compared:".bold(), summary.sheets_compared);
    if summary.sheets_with_differences > 0 {
        println!(
            "  {} {}",
            "Sheets with differences:".yellow().bold(),
            summary.sheets_with_differences
        );
        println!(
            "  {} {}",
            "Differences:".red().bold(),
            summary.total_differences
        );
    }
    if let Some(path) = report_path {
        println!("  {} {}", "Report:".bold(), path.display());
    }
}

fn display_or_blank(value: &str) -> String {
    if value.is_empty() {
        "(blank)".to_string()
    } else {
        format!("{:?}", value)
    }
}

/// Print the comparison in JSON format
pub fn print_json(result: &ComparisonResult, report_path: Option<&Path>) -> Result<()> {
    let output = serde_json::json!({
        "original": result.original,
        "modified": result.modified,
        "report": report_path.map(|p| p.display().to_string()),
        "differences": result.differences().collect::<Vec<_>>(),
        "summary": result.summary(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
