//! `.xlsx` workbooks: read through calamine, written with rust_xlsxwriter.
//!
//! The shop exports orders as workbooks; only the first worksheet is read.
//! Saving writes a single worksheet carrying the name it was read from, so
//! an update in place keeps the order sheet and drops any other sheets.

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use serde_json::{Number, Value};
use std::fs;
use std::path::Path;

use super::{cell_text, Dataset, TabularStore};
use crate::error::{TableError, TableResult};

/// Loads the first worksheet of a workbook and writes one-sheet workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxStore;

impl XlsxStore {
    /// Whether `path` has a workbook extension.
    pub fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"))
    }

    /// Build the in-memory workbook for a dataset.
    pub fn to_workbook(&self, dataset: &Dataset) -> TableResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        if let Some(name) = dataset.sheet_name() {
            worksheet.set_name(name)?;
        }

        for (col, header) in dataset.headers().iter().enumerate() {
            worksheet.write_string(0, col_num(col)?, header.as_str())?;
        }
        for (r, row) in dataset.rows().iter().enumerate() {
            let row_num = row_num(r + 1)?;
            for (c, cell) in row.iter().enumerate() {
                let col = col_num(c)?;
                match cell {
                    Value::Null => {}
                    Value::Bool(b) => {
                        worksheet.write_boolean(row_num, col, *b)?;
                    }
                    Value::Number(n) => match n.as_f64() {
                        Some(f) => {
                            worksheet.write_number(row_num, col, f)?;
                        }
                        None => {
                            worksheet.write_string(row_num, col, n.to_string())?;
                        }
                    },
                    other => {
                        worksheet.write_string(row_num, col, cell_text(other))?;
                    }
                }
            }
        }
        Ok(workbook)
    }
}

fn row_num(row: usize) -> TableResult<RowNum> {
    RowNum::try_from(row).map_err(|_| TableError::Workbook(format!("row {} is beyond the sheet limit", row)))
}

fn col_num(col: usize) -> TableResult<ColNum> {
    ColNum::try_from(col).map_err(|_| TableError::Workbook(format!("column {} is beyond the sheet limit", col)))
}

/// Convert a workbook cell into a dataset value.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::from(*f as i64),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

impl TabularStore for XlsxStore {
    fn load(&self, path: &Path) -> TableResult<Dataset> {
        if !path.exists() {
            return Err(TableError::FileNotFound(path.to_path_buf()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| TableError::Workbook(e.to_string()))?;
        let sheet_name = workbook.sheet_names().first().cloned();

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| TableError::Workbook(e.to_string()))?,
            None => return Ok(Dataset::default()),
        };

        let all: Vec<Vec<Value>> = range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        let dataset = Dataset::from_rows(all);
        Ok(match sheet_name {
            Some(name) => dataset.with_sheet_name(name),
            None => dataset,
        })
    }

    fn save(&self, dataset: &Dataset, path: &Path) -> TableResult<()> {
        let mut workbook = self.to_workbook(dataset)?;

        // Write next to the target, then swap it in whole.
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        workbook.save(&tmp)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_handles_extensions() {
        assert!(XlsxStore::handles(Path::new("orders.xlsx")));
        assert!(XlsxStore::handles(Path::new("ORDERS.XLSM")));
        assert!(!XlsxStore::handles(Path::new("orders.csv")));
        assert!(!XlsxStore::handles(Path::new("orders")));
    }

    #[test]
    fn test_cell_values() {
        assert_eq!(cell_value(&Data::Empty), Value::Null);
        assert_eq!(cell_value(&Data::String(String::new())), Value::Null);
        assert_eq!(cell_value(&Data::Float(123.0)), json!(123));
        assert_eq!(cell_value(&Data::Float(1.5)), json!(1.5));
        assert_eq!(cell_value(&Data::Int(7)), json!(7));
        assert_eq!(cell_value(&Data::Bool(true)), json!(true));
        assert_eq!(cell_value(&Data::String("יוסי".into())), json!("יוסי"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.xlsx");
        let ds = Dataset::from_rows(vec![
            vec![json!("dbId"), json!("Item Name"), json!("price"), json!("paid")],
            vec![json!(123), json!("חברים_90"), json!(49.9), json!(true)],
            vec![json!("124"), Value::Null, json!(30), json!(false)],
        ])
        .with_sheet_name("Orders");

        XlsxStore.save(&ds, &path).unwrap();
        assert!(!dir.path().join("orders.xlsx.tmp").exists());

        let loaded = XlsxStore.load(&path).unwrap();
        assert_eq!(loaded.sheet_name(), Some("Orders"));
        assert_eq!(loaded.headers(), ds.headers());
        assert_eq!(loaded.rows()[0], vec![json!(123), json!("חברים_90"), json!(49.9), json!(true)]);
        assert_eq!(loaded.rows()[1], vec![json!("124"), Value::Null, json!(30), json!(false)]);
    }

    #[test]
    fn test_overwrite_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.xlsx");
        let first = Dataset::from_rows(vec![vec![json!("dbId")], vec![json!(1)], vec![json!(2)]]);
        XlsxStore.save(&first, &path).unwrap();

        let second = Dataset::from_rows(vec![vec![json!("dbId")], vec![json!(3)]]);
        XlsxStore.save(&second, &path).unwrap();

        let loaded = XlsxStore.load(&path).unwrap();
        assert_eq!(loaded.rows(), &[vec![json!(3)]]);
    }
}
