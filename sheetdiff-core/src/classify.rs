//! Value classification: numeric, percentage or text
//!
//! Percentages are carried as percentage points (`12.5` means 12.5%). A cell
//! is treated as a percentage when its number format, its column header or its
//! magnitude says so; `%`-suffixed text is always a percentage.

use crate::reader::{CellValue, Sheet};
use crate::report::CellReference;

/// Numeric tolerance below which two values are considered equal
pub const EPSILON: f64 = 1e-6;

const FORMAT_MARKERS: [&str; 2] = ["%", "percent"];
const HEADER_MARKERS: [&str; 4] = ["%", "percent", "rate", "ratio"];

/// Comparable form of a cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueClass {
    /// Percentage points
    Percentage(f64),
    Numeric(f64),
    NonNumeric,
}

/// Decide whether a cell holds a percentage.
///
/// Checked in order: the number format, the header cell (row 0) of the same
/// column in `sheet`, then a magnitude heuristic for bare fractions such as
/// `0.055`. The heuristic only applies to cells without an explicit format.
pub fn is_percentage(
    value: &CellValue,
    num_fmt: Option<&str>,
    sheet: &Sheet,
    at: CellReference,
) -> bool {
    let num_fmt = num_fmt.filter(|f| !f.eq_ignore_ascii_case("General"));
    if num_fmt.is_some_and(format_is_percentage) {
        return true;
    }
    if header_is_percentage(sheet, at.col) {
        return true;
    }
    num_fmt.is_none() && looks_like_fraction(value)
}

/// Whether a number format code denotes a percentage
pub fn format_is_percentage(num_fmt: &str) -> bool {
    let lower = num_fmt.to_lowercase();
    FORMAT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether the header cell of `col` names a percentage-like quantity
pub fn header_is_percentage(sheet: &Sheet, col: u32) -> bool {
    let header = sheet.value(0, col).to_string().to_lowercase();
    HEADER_MARKERS.iter().any(|m| header.contains(m))
}

/// Numbers in (0, 1] written with at least two decimals
fn looks_like_fraction(value: &CellValue) -> bool {
    let CellValue::Number(n) = value else {
        return false;
    };
    let magnitude = n.abs();
    if magnitude == 0.0 || magnitude > 1.0 {
        return false;
    }
    n.to_string()
        .split_once('.')
        .is_some_and(|(_, fraction)| fraction.len() >= 2)
}

/// Normalize a value to a number.
///
/// Numbers are scaled to percentage points when `is_percentage`. Text ending
/// in `%` yields its percentage points unscaled; other text is parsed with
/// thousands separators removed.
pub fn to_numeric(value: &CellValue, is_percentage: bool) -> Option<f64> {
    match value {
        CellValue::Number(n) if is_percentage => Some(n * 100.0),
        CellValue::Number(n) => Some(*n),
        CellValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            percent_text(text).or_else(|| parse_decimal(text))
        }
        CellValue::Empty => None,
    }
}

/// Classify a value into its comparable form
pub fn classify(value: &CellValue, is_percentage: bool) -> ValueClass {
    let text_percent = value
        .as_text()
        .and_then(|t| percent_text(t.trim()))
        .is_some();

    match to_numeric(value, is_percentage) {
        Some(n) if is_percentage || text_percent => ValueClass::Percentage(n),
        Some(n) => ValueClass::Numeric(n),
        None => ValueClass::NonNumeric,
    }
}

/// Number or numeric text, `%` text excluded
pub fn tolerant_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(text) if !text.trim().ends_with('%') => parse_decimal(text),
        _ => None,
    }
}

/// Percentage points of a number in [0, 1] or of `%` text
pub fn percentage_equivalent(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if (0.0..=1.0).contains(n) => Some(n * 100.0),
        CellValue::Text(text) => percent_text(text.trim()),
        _ => None,
    }
}

fn percent_text(text: &str) -> Option<f64> {
    text.strip_suffix('%').and_then(parse_decimal)
}

/// Strict decimal parse: optional sign, digits, point, exponent; commas ignored
fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit())
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Display text for a cell value
pub fn format_value(value: &CellValue, is_percentage: bool) -> String {
    match classify(value, is_percentage) {
        ValueClass::Percentage(points) => format!("{}%", format_signed(points)),
        ValueClass::Numeric(n) => format_signed(n),
        ValueClass::NonNumeric => value.to_string(),
    }
}

/// Signed difference text: `+` for increases, `-` for decreases, `0` within EPSILON
pub fn format_delta(delta: f64, percentage: bool) -> String {
    let suffix = if percentage { "%" } else { "" };
    if delta.abs() <= EPSILON {
        return format!("0{}", suffix);
    }
    let sign = if delta > 0.0 { "+" } else { "-" };
    format!("{}{}{}", sign, format_number(delta.abs()), suffix)
}

fn format_signed(n: f64) -> String {
    let magnitude = format_number(n.abs());
    if n < 0.0 && magnitude != "0" {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Round to two decimals, drop trailing zeros and group thousands with `,`
pub fn format_number(magnitude: f64) -> String {
    let rounded = (magnitude * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}
