//! Export configuration.
//!
//! Defaults match what the downstream print queue accepts. Values can be
//! overridden from the environment (a `.env` file is honored):
//!
//! - `STICKERLOAD_CHUNK_SIZE` - records per exported batch
//! - `STICKERLOAD_OUTPUT_DIR` - root folder for dated order tables
//! - `STICKERLOAD_TABLE_FORMAT` - `xlsx` (default) or `csv` for order tables

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::table::TableFormat;

/// Records per exported batch.
pub const DEFAULT_CHUNK_SIZE: usize = 24;

/// Root folder for dated order tables.
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Options shared by the export commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Maximum records per artifact
    pub chunk_size: usize,

    /// Root folder for `export-orders`
    pub output_dir: PathBuf,

    /// Write JSON batches after transforming a file
    pub export_json: bool,

    /// Format of the tables written by `export-orders`
    pub table_format: TableFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            export_json: true,
            table_format: TableFormat::default(),
        }
    }
}

impl ExportOptions {
    /// Defaults overridden by `STICKERLOAD_*` environment variables.
    ///
    /// Unparseable or zero chunk sizes fall back to the default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(size) = lookup("STICKERLOAD_CHUNK_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            options.chunk_size = size;
        }
        if let Some(dir) = lookup("STICKERLOAD_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            options.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = lookup("STICKERLOAD_TABLE_FORMAT").and_then(|v| v.parse().ok()) {
            options.table_format = format;
        }
        options
    }
}
