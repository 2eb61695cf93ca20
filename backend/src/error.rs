//! Error types for the Stickerload order engine.
//!
//! This module defines one error type per concern:
//!
//! - [`TableError`] - Loading and saving tabular files
//! - [`TransformError`] - Turning order rows into records
//! - [`ExportError`] - Writing chunked JSON / table artifacts
//! - [`MutationError`] - Updating rows by `dbId`
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Text extraction has no error type: unparseable text yields `None`
//! so a row is never dropped because one field did not parse.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Tabular Substrate Errors
// =============================================================================

/// Errors while reading or writing a tabular file.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Failed to read or write the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid CSV content.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid or unreadable workbook.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// Failed to write a workbook.
    #[error("Failed to write workbook: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while transforming order rows into records.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No header row or no data row.
    #[error("Dataset is empty or missing data")]
    EmptyDataset,

    /// None of the mapped columns exists in the header.
    #[error("None of the expected columns were found: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    /// The source file could not be read.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

impl TransformError {
    /// Whether the caller should treat this as "no data" rather than a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            TransformError::EmptyDataset | TransformError::MissingHeaders(_)
        )
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while exporting records.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Chunk size must be at least 1.
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// JSON could not be parsed or written.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Orders must be a list of objects.
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// No orders were provided.
    #[error("No orders provided")]
    EmptyOrders,

    /// Failed to write an artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write a table artifact.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Errors while updating rows by identifier.
#[derive(Debug, Error)]
pub enum MutationError {
    /// A required column is absent from the header.
    #[error("Missing required column: '{0}'")]
    MissingColumn(String),

    /// No row carries the requested identifier.
    #[error("dbId {0} not found in file")]
    NotFound(String),

    /// The file could not be loaded or saved.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the pipeline entry points.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Table error.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Mutation error.
    #[error("Update error: {0}")]
    Mutation(#[from] MutationError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for tabular operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TransformError -> PipelineError
        let err: PipelineError = TransformError::EmptyDataset.into();
        assert!(err.to_string().contains("empty"));

        // TableError -> MutationError -> PipelineError
        let table_err = TableError::FileNotFound(PathBuf::from("orders.csv"));
        let mutation_err: MutationError = table_err.into();
        let err: PipelineError = mutation_err.into();
        assert!(err.to_string().contains("orders.csv"));
    }

    #[test]
    fn test_no_data_classification() {
        assert!(TransformError::EmptyDataset.is_no_data());
        assert!(TransformError::MissingHeaders(vec!["Item Name".into()]).is_no_data());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(!TransformError::Table(TableError::Io(io)).is_no_data());
    }

    #[test]
    fn test_mutation_error_format() {
        let msg = MutationError::MissingColumn("graphicStatus".into()).to_string();
        assert!(msg.contains("graphicStatus"));
        let msg = MutationError::NotFound("999".into()).to_string();
        assert!(msg.contains("999"));
    }
}
