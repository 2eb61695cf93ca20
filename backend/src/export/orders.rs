//! Orders JSON → dated order tables.
//!
//! Orders coming back from the back-office API are written as tables of at
//! most 24 rows under `<output_dir>/<YYYY-MM-DD>/orders_<YYYY-MM-DD>_<i>.<ext>`,
//! as workbooks by default or as CSV. The day folder also receives the run log.

use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::chunks::chunk_records;
use crate::error::{ExportError, ExportResult};
use crate::logs::EventLog;
use crate::models::OrderRecord;
use crate::table::{Dataset, TableFormat};

/// Parse orders text: a non-empty JSON array of objects.
pub fn parse_json_orders(text: &str) -> ExportResult<Vec<OrderRecord>> {
    let value: Value = serde_json::from_str(text)?;
    orders_from_value(value)
}

/// Validate an already-parsed orders value.
pub fn orders_from_value(value: Value) -> ExportResult<Vec<OrderRecord>> {
    let Value::Array(items) = value else {
        return Err(ExportError::InvalidStructure("must be a list of objects".to_string()));
    };
    if items.is_empty() {
        return Err(ExportError::EmptyOrders);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(OrderRecord::from(map)),
            _ => Err(ExportError::InvalidStructure(format!("order {} is not an object", i))),
        })
        .collect()
}

/// Create (if needed) the day folder and attach the log to it.
pub fn create_output_folder(base_dir: &Path, day: NaiveDate, log: &EventLog) -> ExportResult<PathBuf> {
    let full_path = base_dir.join(day.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&full_path)?;
    log.attach_dir(&full_path)?;
    log.info(format!("Output directory created: {}", full_path.display()));
    Ok(full_path)
}

/// Table for one chunk; columns come from the first order's fields.
pub fn orders_table(orders: &[OrderRecord]) -> Dataset {
    let headers: Vec<String> = orders
        .first()
        .map(|o| o.fields().cloned().collect())
        .unwrap_or_default();

    let rows = orders
        .iter()
        .map(|order| {
            headers
                .iter()
                .map(|h| order.get(h).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Dataset::new(headers, rows)
}

/// Write orders as chunked tables, returning the files written.
pub fn save_orders_to_tables(
    orders: &[OrderRecord],
    output_dir: &Path,
    max_per_file: usize,
    format: TableFormat,
    log: &EventLog,
) -> ExportResult<Vec<PathBuf>> {
    save_orders_to_tables_on(orders, output_dir, max_per_file, format, Local::now().date_naive(), log)
}

/// [`save_orders_to_tables`] for an explicit day.
pub fn save_orders_to_tables_on(
    orders: &[OrderRecord],
    output_dir: &Path,
    max_per_file: usize,
    format: TableFormat,
    day: NaiveDate,
    log: &EventLog,
) -> ExportResult<Vec<PathBuf>> {
    if orders.is_empty() {
        return Err(ExportError::EmptyOrders);
    }
    let batches = chunk_records(orders, max_per_file)?;
    let folder = create_output_folder(output_dir, day, log)?;
    let store = format.store();

    let mut written = Vec::with_capacity(batches.len());
    for batch in &batches {
        let filename = format!("orders_{}_{}.{}", day.format("%Y-%m-%d"), batch.index, format.extension());
        let full_path = folder.join(filename);
        store.save(&orders_table(batch.records), &full_path)?;
        log.info(format!("Saved file: {}", full_path.display()));
        written.push(full_path);
    }

    log.success(format!("Successfully saved {} table file(s).", written.len()));
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LOG_FILE_NAME;
    use crate::table::{CsvStore, TabularStore, XlsxStore};
    use serde_json::json;
    use tempfile::tempdir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_parse_valid_list() {
        let orders = parse_json_orders(r#"[{"orderId": 1}, {"orderId": 2}]"#).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].get("orderId"), Some(&json!(2)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_json_orders("{not json"), Err(ExportError::Json(_))));
        assert!(matches!(
            parse_json_orders(r#"{"not": "a list"}"#),
            Err(ExportError::InvalidStructure(_))
        ));
        assert!(matches!(
            parse_json_orders(r#"[{"orderId": 1}, 2]"#),
            Err(ExportError::InvalidStructure(_))
        ));
        assert!(matches!(parse_json_orders("[]"), Err(ExportError::EmptyOrders)));
    }

    #[test]
    fn test_orders_table_uses_first_order_columns() {
        let orders = orders_from_value(json!([
            {"dbId": 1, "itemName": "חברים_90", "graphicStatus": "new"},
            {"dbId": 2, "itemName": "חברים_52", "extra": "ignored"},
        ]))
        .unwrap();
        let table = orders_table(&orders);
        assert_eq!(table.headers(), &["dbId", "itemName", "graphicStatus"]);
        assert_eq!(table.rows()[1], vec![json!(2), json!("חברים_52"), Value::Null]);
    }

    #[test]
    fn test_save_orders_in_dated_folder() {
        let tmp = tempdir().unwrap();
        let orders: Vec<OrderRecord> = (0..13)
            .map(|i| OrderRecord::from(json!({"dbId": i, "status": "new"}).as_object().unwrap().clone()))
            .collect();

        let log = EventLog::silent();
        let files = save_orders_to_tables_on(&orders, tmp.path(), 5, TableFormat::Csv, day(), &log).unwrap();

        let folder = tmp.path().join("2025-06-15");
        assert_eq!(
            files,
            vec![
                folder.join("orders_2025-06-15_1.csv"),
                folder.join("orders_2025-06-15_2.csv"),
                folder.join("orders_2025-06-15_3.csv"),
            ]
        );
        let last = CsvStore::new().load(&files[2]).unwrap();
        assert_eq!(last.headers(), &["dbId", "status"]);
        assert_eq!(last.row_count(), 3);
        assert_eq!(last.cell(0, 0), Some(&json!("10")));

        let log_content = fs::read_to_string(folder.join(LOG_FILE_NAME)).unwrap();
        assert!(log_content.contains("Saved file"));
    }

    #[test]
    fn test_save_orders_as_workbooks() {
        let tmp = tempdir().unwrap();
        let orders = orders_from_value(json!([
            {"dbId": 1, "itemName": "חברים_52", "name": "יוסי"},
            {"dbId": 2, "itemName": "חברים_90", "name": " "},
            {"dbId": 3, "itemName": "קשת בענן_90", "name": "נועה"},
        ]))
        .unwrap();

        let files =
            save_orders_to_tables_on(&orders, tmp.path(), 2, TableFormat::Xlsx, day(), &EventLog::silent()).unwrap();
        let folder = tmp.path().join("2025-06-15");
        assert_eq!(
            files,
            vec![folder.join("orders_2025-06-15_1.xlsx"), folder.join("orders_2025-06-15_2.xlsx")]
        );

        let first = XlsxStore.load(&files[0]).unwrap();
        assert_eq!(first.headers(), &["dbId", "itemName", "name"]);
        assert_eq!(first.rows()[0], vec![json!(1), json!("חברים_52"), json!("יוסי")]);
        let second = XlsxStore.load(&files[1]).unwrap();
        assert_eq!(second.rows(), &[vec![json!(3), json!("קשת בענן_90"), json!("נועה")]]);
    }

    #[test]
    fn test_save_empty_orders_fails() {
        let tmp = tempdir().unwrap();
        let result = save_orders_to_tables_on(&[], tmp.path(), 24, TableFormat::Xlsx, day(), &EventLog::silent());
        assert!(matches!(result, Err(ExportError::EmptyOrders)));
        assert!(!tmp.path().join("2025-06-15").exists());
    }
}
