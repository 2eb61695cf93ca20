//! High-level pipeline API: order export file → records → JSON batches.
//!
//! # Example
//!
//! ```rust,ignore
//! use stickerload::{orders_to_json, EventLog, ExportOptions};
//! use std::path::Path;
//!
//! let log = EventLog::new();
//! let result = orders_to_json(Path::new("orders.xlsx"), &ExportOptions::default(), &log)?;
//! println!("{} records in {:?}", result.records.len(), result.export_dir);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::records::transform_detailed;
use crate::config::ExportOptions;
use crate::error::{PipelineResult, TransformError};
use crate::export::chunks::export_json_chunks;
use crate::logs::EventLog;
use crate::models::{FieldMapping, OrderRecord};
use crate::table::{open_store, Dataset};

/// Result of transforming an order export file
#[derive(Debug, Clone, Serialize)]
pub struct OrdersJsonResult {
    /// Normalized records, split packs included
    pub records: Vec<OrderRecord>,

    /// Data rows read from the file
    pub source_rows: usize,

    /// Sheet line numbers whose item name was kept raw
    pub unparsed_lines: Vec<usize>,

    /// Folder holding the JSON batches, when exported
    pub export_dir: Option<PathBuf>,
}

/// Transform an order export file and write its JSON batches next to it.
///
/// Batches go to `<file without extension>_jsons_<timestamp>/`.
pub fn orders_to_json(path: &Path, options: &ExportOptions, log: &EventLog) -> PipelineResult<OrdersJsonResult> {
    log.info(format!("📖 Reading orders: {}", path.display()));
    let dataset = open_store(path).load(path)?;
    log.success(format!("Read {} rows, {} columns", dataset.row_count(), dataset.headers().len()));

    let mut result = transform_dataset(&dataset, &FieldMapping::default(), log)?;

    if options.export_json {
        let base = path.with_extension("");
        let dir = export_json_chunks(&result.records, &base, options.chunk_size, log)?;
        result.export_dir = Some(dir);
    }

    Ok(result)
}

/// Like [`orders_to_json`], but "no data" and failures are logged and yield `None`.
pub fn orders_to_json_soft(path: &Path, options: &ExportOptions, log: &EventLog) -> Option<Vec<OrderRecord>> {
    match orders_to_json(path, options, log) {
        Ok(result) => Some(result.records),
        Err(crate::error::PipelineError::Transform(e)) if e.is_no_data() => {
            log.warning(e.to_string());
            None
        }
        Err(e) => {
            log.error(format!("Failed to convert orders to filtered JSON: {}", e));
            None
        }
    }
}

/// Transform an in-memory dataset, logging a summary.
pub fn transform_dataset(
    dataset: &Dataset,
    mapping: &FieldMapping,
    log: &EventLog,
) -> Result<OrdersJsonResult, TransformError> {
    log.info("⚙️  Extracting designs and names...");
    let outcome = transform_detailed(dataset, mapping)?;
    log.success(outcome.summary());

    if !outcome.unparsed_lines.is_empty() {
        let sample: Vec<String> = outcome.unparsed_lines.iter().take(5).map(|l| l.to_string()).collect();
        let more = if outcome.unparsed_lines.len() > 5 {
            format!("... +{}", outcome.unparsed_lines.len() - 5)
        } else {
            String::new()
        };
        log.warning(format!("Item names kept as written (lines: {}{})", sample.join(", "), more));
    }

    Ok(OrdersJsonResult {
        records: outcome.records,
        source_rows: dataset.row_count(),
        unparsed_lines: outcome.unparsed_lines,
        export_dir: None,
    })
}

// =============================================================================
// Raw table → JSON
// =============================================================================

/// Every data row as an object keyed by header.
///
/// Blank headers are skipped; absent or empty cells become `""`.
pub fn table_to_json(dataset: &Dataset) -> Vec<Map<String, Value>> {
    let columns: Vec<(usize, &String)> = dataset
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .collect();

    (0..dataset.row_count())
        .map(|row| {
            columns
                .iter()
                .map(|&(idx, header)| {
                    let value = match dataset.cell(row, idx) {
                        None | Some(Value::Null) => Value::String(String::new()),
                        Some(v) => v.clone(),
                    };
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Convert a table file to `<file without extension>.json`.
///
/// Returns the rows and the path written.
pub fn convert_table_to_json(path: &Path, log: &EventLog) -> PipelineResult<(Vec<Map<String, Value>>, PathBuf)> {
    let dataset = open_store(path).load(path)?;
    if dataset.is_empty() {
        return Err(TransformError::EmptyDataset.into());
    }

    let rows = table_to_json(&dataset);
    let output = path.with_extension("json");
    fs::write(&output, serde_json::to_string_pretty(&rows)?)?;
    log.success(format!("Exported raw JSON to {}", output.display()));

    Ok((rows, output))
}
