//! Fixed-size JSON batches for the print queue.
//!
//! The queue accepts at most 24 records per upload, so records are written as
//! `data_part_1.json`, `data_part_2.json`, ... inside a fresh
//! `<base>_jsons_<YYYY-MM-DD_HH-MM-SS>` folder per export.

use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExportError, ExportResult};
use crate::logs::EventLog;
use crate::models::OrderRecord;

/// Timestamp suffix format of export folders.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

static PART_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data_part_(\d+)\.json$").expect("invalid part file pattern"));

/// One batch of an export.
#[derive(Debug, Clone)]
pub struct ExportBatch<'a, T> {
    /// 1-based position in the export
    pub index: usize,
    pub records: &'a [T],
}

impl<T> ExportBatch<'_, T> {
    pub fn file_name(&self) -> String {
        format!("data_part_{}.json", self.index)
    }
}

/// Partition records into contiguous batches of at most `size`.
pub fn chunk_records<T>(records: &[T], size: usize) -> ExportResult<Vec<ExportBatch<'_, T>>> {
    if size == 0 {
        return Err(ExportError::InvalidChunkSize(size));
    }
    Ok(records
        .chunks(size)
        .enumerate()
        .map(|(i, records)| ExportBatch { index: i + 1, records })
        .collect())
}

/// `<base>_jsons_<timestamp>`
pub fn export_dir_for(base: &Path, at: NaiveDateTime) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push("_jsons_");
    name.push(at.format(EXPORT_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Write records as JSON batches and return the export folder.
pub fn export_json_chunks<T: Serialize>(
    records: &[T],
    base: &Path,
    chunk_size: usize,
    log: &EventLog,
) -> ExportResult<PathBuf> {
    export_json_chunks_at(records, base, chunk_size, Local::now().naive_local(), log)
}

/// [`export_json_chunks`] with an explicit run timestamp.
pub fn export_json_chunks_at<T: Serialize>(
    records: &[T],
    base: &Path,
    chunk_size: usize,
    at: NaiveDateTime,
    log: &EventLog,
) -> ExportResult<PathBuf> {
    let batches = chunk_records(records, chunk_size)?;
    let output_dir = export_dir_for(base, at);
    fs::create_dir_all(&output_dir)?;

    for batch in &batches {
        let output_path = output_dir.join(batch.file_name());
        let json = serde_json::to_string_pretty(batch.records)?;
        fs::write(&output_path, json)?;
        log.info(format!("Exported chunk to {}", output_path.display()));
    }

    log.success(format!(
        "Exported {} records in {} file(s) to {}",
        records.len(),
        batches.len(),
        output_dir.display()
    ));
    Ok(output_dir)
}

/// Read every `data_part_<i>.json` of an export folder back, in index order.
pub fn load_json_chunks(dir: &Path) -> ExportResult<Vec<OrderRecord>> {
    let mut parts: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let index = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| PART_FILE.captures(n))
            .and_then(|caps| caps[1].parse::<usize>().ok());
        if let Some(index) = index {
            parts.push((index, path));
        }
    }
    parts.sort_by_key(|(index, _)| *index);

    let mut records = Vec::new();
    for (_, path) in parts {
        let content = fs::read_to_string(&path)?;
        let batch: Vec<OrderRecord> = serde_json::from_str(&content)?;
        records.extend(batch);
    }
    Ok(records)
}
