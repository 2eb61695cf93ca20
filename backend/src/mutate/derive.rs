//! Columns computed from other columns.

use serde_json::Value;
use std::path::Path;

use crate::error::{MutationError, MutationResult};
use crate::extract::extract_name_before_addon;
use crate::logs::EventLog;
use crate::table::{cell_text, open_store, Dataset};

/// Column holding the free-text order form answers.
pub const COMMENTS_COLUMN: &str = "Line Comments";

/// Column appended by [`add_name_column`].
pub const DERIVED_NAME_COLUMN: &str = "Name";

/// Append a `Name` column filled from each row's `Line Comments`.
///
/// Rows without the form layout get an empty cell.
pub fn add_name_column(dataset: &mut Dataset) -> MutationResult<()> {
    let comments_col = dataset
        .column_index(COMMENTS_COLUMN)
        .ok_or_else(|| MutationError::MissingColumn(COMMENTS_COLUMN.to_string()))?;

    let names: Vec<String> = (0..dataset.row_count())
        .map(|row| {
            let comments = dataset.cell(row, comments_col).map(cell_text).unwrap_or_default();
            extract_name_before_addon(&comments)
        })
        .collect();

    let name_col = dataset.push_header(DERIVED_NAME_COLUMN);
    for (row, name) in names.into_iter().enumerate() {
        let value = if name.is_empty() { Value::Null } else { Value::String(name) };
        dataset.set_cell(row, name_col, value);
    }
    Ok(())
}

/// [`add_name_column`] on a table file, saved to `save_as` or in place.
pub fn add_name_column_in_file(path: &Path, save_as: Option<&Path>, log: &EventLog) -> MutationResult<usize> {
    let result = (|| -> MutationResult<usize> {
        let mut dataset = open_store(path).load(path)?;
        add_name_column(&mut dataset)?;

        let output = save_as.unwrap_or(path);
        open_store(output).save(&dataset, output)?;
        Ok(dataset.row_count())
    })();

    match &result {
        Ok(rows) => log.success(format!(
            "Added '{}' column to {} rows of {}",
            DERIVED_NAME_COLUMN,
            rows,
            save_as.unwrap_or(path).display()
        )),
        Err(e) => log.error(format!("Failed to add '{}' column: {}", DERIVED_NAME_COLUMN, e)),
    }
    result
}
