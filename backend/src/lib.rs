//! # Stickerload - order line-item interpretation for a personalized sticker shop
//!
//! Stickerload reads order exports from the shop (CSV or XLSX), recognizes the
//! sticker design, size and personalization name written in free text, and
//! produces normalized records in fixed-size JSON batches for the print queue.
//! It also updates order tables in place by `dbId`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Order table │────▶│    Table    │────▶│  Transform  │────▶│ JSON chunks │
//! │ (CSV/XLSX)  │     │ (auto-enc)  │     │ (extract +  │     │  (24/file)  │
//! └─────────────┘     └─────────────┘     │   split)    │     └─────────────┘
//!                            ▲            └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │   Mutate    │  update by dbId, derived columns
//!                     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stickerload::{orders_to_json, EventLog, ExportOptions};
//! use std::path::Path;
//!
//! let log = EventLog::new();
//! let result = orders_to_json(Path::new("orders.csv"), &ExportOptions::from_env(), &log)?;
//! println!("{} records", result.records.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`logs`] - Injectable event log (stderr, subscribers, log files)
//! - [`config`] - Export options
//! - [`models`] - Order records, field mapping, design variants
//! - [`table`] - Dataset and CSV/XLSX stores (read and write)
//! - [`extract`] - Design and name extraction from free text
//! - [`transform`] - Rows to records, pack splitting, pipeline
//! - [`export`] - JSON batches and dated order tables
//! - [`mutate`] - Row updates by `dbId` and derived columns

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Tabular substrate
pub mod table;

// Text extraction
pub mod extract;

// Transformation
pub mod transform;

// Artifacts
pub mod export;

// Row updates
pub mod mutate;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError, ExportResult, MutationError, MutationResult, PipelineError, PipelineResult, TableError,
    TableResult, TransformError, TransformResult,
};

// =============================================================================
// Re-exports - Config & Logging
// =============================================================================

pub use config::ExportOptions;
pub use logs::{EventLog, LogEntry, LogLevel, LOG_FILE_NAME};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{DesignVariant, FieldMapping, OrderRecord, SizeToken, ID_COLUMN};

// =============================================================================
// Re-exports - Tables
// =============================================================================

pub use table::{cell_text, open_store, CsvStore, Dataset, TableFormat, TabularStore, XlsxStore};

// =============================================================================
// Re-exports - Extraction
// =============================================================================

pub use extract::{extract_design_variant, extract_name_before_addon, extract_personalization_name};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    convert_table_to_json, orders_to_json, orders_to_json_soft, split_variants, table_to_json, transform,
    transform_dataset, transform_soft, OrdersJsonResult,
};

// =============================================================================
// Re-exports - Export & Mutation
// =============================================================================

pub use export::{chunk_records, export_json_chunks, load_json_chunks, parse_json_orders, save_orders_to_tables};
pub use mutate::{
    add_name_column, add_name_column_in_file, bulk_update_column, bulk_update_in_file, find_row, update_row,
    update_row_in_file,
};
