//! Workbook data structures

use std::collections::HashMap;
use std::fmt;

static EMPTY: CellValue = CellValue::Empty;

/// Represents a complete workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    /// File name or other identifier of where the workbook came from
    pub source: String,
    /// Sheets in workbook order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Represents a worksheet as a sparse grid addressed by zero-based (row, col)
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    /// Build a sheet from dense rows, skipping empty values
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Self::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                sheet.set(row as u32, col as u32, value);
            }
        }
        sheet
    }

    /// Store a value, dropping empties so that they never widen the bounding box
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), Cell::new(value));
        }
    }

    /// Attach a number-format hint to an existing cell
    pub fn set_num_fmt(&mut self, row: u32, col: u32, num_fmt: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(&(row, col)) {
            cell.num_fmt = Some(num_fmt.into());
        }
    }

    /// Value at the given position, `Empty` when out of range
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cells
            .get(&(row, col))
            .map(|c| &c.value)
            .unwrap_or(&EMPTY)
    }

    /// Number-format hint at the given position
    pub fn num_fmt(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&(row, col))
            .and_then(|c| c.num_fmt.as_deref())
    }

    /// (rows, cols) of the smallest A1-anchored box holding every non-empty cell
    pub fn dimensions(&self) -> (u32, u32) {
        self.cells
            .iter()
            .filter(|(_, c)| !c.value.is_empty())
            .fold((0, 0), |(rows, cols), (&(r, c), _)| {
                (rows.max(r + 1), cols.max(c + 1))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions() == (0, 0)
    }
}

/// Represents a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    /// Number format code, e.g. `0.00%`
    pub num_fmt: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            num_fmt: None,
        }
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Empty cells and empty strings are blank; whitespace is content
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Raw display text: numbers in shortest round-trip form, text verbatim
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}
