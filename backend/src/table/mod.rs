//! In-memory tabular data and the file stores that load and persist it.
//!
//! The engine never touches files directly: it works on a [`Dataset`] and
//! goes through a [`TabularStore`] to read or write it.
//!
//! - [`csv_store`] - CSV with encoding and delimiter auto-detection
//! - [`xlsx`] - `.xlsx` workbooks (first worksheet)

pub mod csv_store;
pub mod xlsx;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::TableResult;

pub use csv_store::{decode_content, detect_delimiter, detect_encoding, CsvStore};
pub use xlsx::XlsxStore;

// =============================================================================
// Dataset
// =============================================================================

/// A header row plus data rows.
///
/// Data rows may be shorter than the header. Every access is bounds-checked
/// and a missing trailing cell is reported as absent, never padded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
    delimiter: Option<u8>,
    sheet_name: Option<String>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            headers,
            rows,
            delimiter: None,
            sheet_name: None,
        }
    }

    /// Build from raw rows where the first row is the header.
    pub fn from_rows(mut all: Vec<Vec<Value>>) -> Self {
        if all.is_empty() {
            return Self::default();
        }
        let headers = all.remove(0).iter().map(cell_text).collect();
        Self::new(headers, all)
    }

    /// Remember the delimiter the dataset was read with.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn delimiter(&self) -> Option<u8> {
        self.delimiter
    }

    /// Remember the worksheet the dataset was read from.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is no header or no data row.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Column name → position, first occurrence wins.
    pub fn header_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.headers.len());
        for (i, header) in self.headers.iter().enumerate() {
            index.entry(header.as_str()).or_insert(i);
        }
        index
    }

    /// Cell at `(row, col)`; `None` when the row is too short.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Write a cell, extending a short row with empty cells up to `col`.
    ///
    /// Returns `false` when `row` does not exist.
    pub fn set_cell(&mut self, row: usize, col: usize, value: Value) -> bool {
        let Some(cells) = self.rows.get_mut(row) else {
            return false;
        };
        if cells.len() <= col {
            cells.resize(col + 1, Value::Null);
        }
        cells[col] = value;
        true
    }

    /// Append a column header and return its position.
    pub fn push_header(&mut self, name: impl Into<String>) -> usize {
        self.headers.push(name.into());
        self.headers.len() - 1
    }
}

/// String form of a cell, used for identifier comparison and CSV output.
///
/// Empty cells render as `""`; integral numbers render without a fraction.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Stores
// =============================================================================

/// Loads and persists datasets.
pub trait TabularStore {
    /// Read the first sheet of `path`. Missing files are `TableError::FileNotFound`.
    fn load(&self, path: &Path) -> TableResult<Dataset>;

    /// Replace the contents of `path` with `dataset`.
    fn save(&self, dataset: &Dataset, path: &Path) -> TableResult<()>;
}

/// Pick a store from the file extension (`.xlsx`/`.xlsm` or CSV).
pub fn open_store(path: &Path) -> Box<dyn TabularStore> {
    if XlsxStore::handles(path) {
        Box::new(XlsxStore)
    } else {
        Box::new(CsvStore::default())
    }
}

/// File format for generated tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Csv => "csv",
        }
    }

    pub fn store(self) -> Box<dyn TabularStore> {
        match self {
            TableFormat::Xlsx => Box::new(XlsxStore),
            TableFormat::Csv => Box::new(CsvStore::default()),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(TableFormat::Xlsx),
            "csv" => Ok(TableFormat::Csv),
            other => Err(format!("Unknown table format '{}', expected xlsx or csv", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::from_rows(vec![
            vec![json!("dbId"), json!("graphicStatus"), json!("orderStatus")],
            vec![json!(123), json!("OldGraphic"), json!("OldOrder")],
            vec![json!("124")],
        ])
    }

    #[test]
    fn test_ragged_rows_are_absent_not_errors() {
        let ds = sample();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.cell(1, 0), Some(&json!("124")));
        assert_eq!(ds.cell(1, 2), None);
        assert_eq!(ds.cell(5, 0), None);
    }

    #[test]
    fn test_set_cell_extends_short_row() {
        let mut ds = sample();
        assert!(ds.set_cell(1, 2, json!("done")));
        assert_eq!(ds.rows()[1], vec![json!("124"), Value::Null, json!("done")]);
        assert!(!ds.set_cell(9, 0, json!("x")));
    }

    #[test]
    fn test_header_index_first_occurrence() {
        let ds = Dataset::new(vec!["a".into(), "b".into(), "a".into()], vec![]);
        assert_eq!(ds.header_index()["a"], 0);
        assert_eq!(ds.column_index("b"), Some(1));
        assert!(ds.is_empty());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(123)), "123");
        assert_eq!(cell_text(&json!(123.0)), "123");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!("שלום")), "שלום");
    }

    #[test]
    fn test_open_store_by_extension() {
        // Only checks dispatch; loading a missing file reports FileNotFound.
        let store = open_store(Path::new("missing.xlsx"));
        assert!(matches!(
            store.load(Path::new("missing.xlsx")),
            Err(crate::error::TableError::FileNotFound(_))
        ));
        let store = open_store(Path::new("missing.csv"));
        assert!(matches!(
            store.load(Path::new("missing.csv")),
            Err(crate::error::TableError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_table_format() {
        assert_eq!(TableFormat::default(), TableFormat::Xlsx);
        assert_eq!("CSV".parse::<TableFormat>(), Ok(TableFormat::Csv));
        assert_eq!(" xlsx".parse::<TableFormat>(), Ok(TableFormat::Xlsx));
        assert!("ods".parse::<TableFormat>().is_err());
        assert_eq!(TableFormat::Csv.extension(), "csv");
    }
}
