//! Row updates by stable identifier (`dbId`).
//!
//! Identifiers are compared by their text form, so a numeric `123` matches a
//! stored `"123"`. Updates are applied to the in-memory [`Dataset`]; the
//! `*_in_file` helpers load through a [`TabularStore`], mutate, then persist
//! the whole file once.

pub mod derive;

use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;

use crate::error::{MutationError, MutationResult};
use crate::logs::EventLog;
use crate::models::ID_COLUMN;
use crate::table::{cell_text, open_store, Dataset};

pub use derive::{add_name_column, add_name_column_in_file, DERIVED_NAME_COLUMN};

fn require_column(dataset: &Dataset, column: &str) -> MutationResult<usize> {
    dataset
        .column_index(column)
        .ok_or_else(|| MutationError::MissingColumn(column.to_string()))
}

fn matches_id(dataset: &Dataset, row: usize, id_col: usize, id: &str) -> bool {
    dataset.cell(row, id_col).is_some_and(|cell| cell_text(cell) == id)
}

/// First data row whose `id_column` cell equals `id`.
pub fn find_row(dataset: &Dataset, id_column: &str, id: impl Display) -> Option<usize> {
    let id_col = dataset.column_index(id_column)?;
    let id = id.to_string();
    (0..dataset.row_count()).find(|&row| matches_id(dataset, row, id_col, &id))
}

/// Every data row whose `id_column` cell equals `id`, when there is more than one.
pub fn find_duplicate_rows(dataset: &Dataset, id_column: &str, id: impl Display) -> Vec<usize> {
    let Some(id_col) = dataset.column_index(id_column) else {
        return Vec::new();
    };
    let id = id.to_string();
    let rows: Vec<usize> = (0..dataset.row_count())
        .filter(|&row| matches_id(dataset, row, id_col, &id))
        .collect();
    if rows.len() > 1 {
        rows
    } else {
        Vec::new()
    }
}

/// Set several columns on the row with the given `dbId`.
///
/// Every update column is checked before anything is written, so a bad
/// column name leaves the dataset untouched. Returns the updated row index.
pub fn update_row<K: AsRef<str>>(
    dataset: &mut Dataset,
    id: impl Display,
    updates: impl IntoIterator<Item = (K, Value)>,
) -> MutationResult<usize> {
    let header = dataset.header_index();
    let id_col = *header
        .get(ID_COLUMN)
        .ok_or_else(|| MutationError::MissingColumn(ID_COLUMN.to_string()))?;

    let mut targets = Vec::new();
    for (column, value) in updates {
        let column = column.as_ref();
        let col = *header
            .get(column)
            .ok_or_else(|| MutationError::MissingColumn(column.to_string()))?;
        targets.push((col, value));
    }
    drop(header);

    let id = id.to_string();
    let row = (0..dataset.row_count())
        .find(|&row| matches_id(dataset, row, id_col, &id))
        .ok_or(MutationError::NotFound(id))?;

    for (col, value) in targets {
        dataset.set_cell(row, col, value);
    }
    Ok(row)
}

/// Set `column` to `value` on every row whose `dbId` is in `ids`.
///
/// Returns how many rows were updated; zero matches is not an error.
pub fn bulk_update_column<I>(dataset: &mut Dataset, ids: I, column: &str, value: &Value) -> MutationResult<usize>
where
    I: IntoIterator,
    I::Item: Display,
{
    let id_col = require_column(dataset, ID_COLUMN)?;
    let col = require_column(dataset, column)?;
    let ids: HashSet<String> = ids.into_iter().map(|id| id.to_string()).collect();

    let rows: Vec<usize> = (0..dataset.row_count())
        .filter(|&row| {
            dataset
                .cell(row, id_col)
                .is_some_and(|cell| ids.contains(&cell_text(cell)))
        })
        .collect();

    for &row in &rows {
        dataset.set_cell(row, col, value.clone());
    }
    Ok(rows.len())
}

// =============================================================================
// File-level helpers
// =============================================================================

/// Update one row of a table file and save it to `save_as` or back in place.
///
/// Nothing is written when the identifier is not found.
pub fn update_row_in_file(
    path: &Path,
    id: impl Display,
    updates: &[(String, Value)],
    save_as: Option<&Path>,
    log: &EventLog,
) -> MutationResult<usize> {
    let id = id.to_string();
    let result = (|| -> MutationResult<usize> {
        let mut dataset = open_store(path).load(path)?;

        let duplicates = find_duplicate_rows(&dataset, ID_COLUMN, &id);
        if !duplicates.is_empty() {
            let lines: Vec<String> = duplicates.iter().map(|r| (r + 2).to_string()).collect();
            log.warning(format!(
                "dbId {} appears on lines {}, updating the first one",
                id,
                lines.join(", ")
            ));
        }

        let row = update_row(&mut dataset, &id, updates.iter().map(|(c, v)| (c.as_str(), v.clone())))?;
        for (column, value) in updates {
            log.info(format!("dbId={}: '{}' updated to '{}'", id, column, cell_text(value)));
        }

        let output = save_as.unwrap_or(path);
        open_store(output).save(&dataset, output)?;
        log.info(format!("File saved: {}", output.display()));
        Ok(row)
    })();

    match &result {
        Ok(_) => log.success(format!("Row with dbId={} updated successfully.", id)),
        Err(MutationError::NotFound(_)) => log.warning(format!("dbId {} not found in file.", id)),
        Err(e) => log.error(format!("Failed to update {}: {}", path.display(), e)),
    }
    result
}

/// Bulk-update one column of a table file and save it.
pub fn bulk_update_in_file(
    path: &Path,
    ids: &[String],
    column: &str,
    value: &Value,
    save_as: Option<&Path>,
    log: &EventLog,
) -> MutationResult<usize> {
    let result = (|| -> MutationResult<usize> {
        let mut dataset = open_store(path).load(path)?;
        let updated = bulk_update_column(&mut dataset, ids, column, value)?;

        let output = save_as.unwrap_or(path);
        open_store(output).save(&dataset, output)?;
        if save_as.is_some() {
            log.info(format!("File saved as {}", output.display()));
        } else {
            log.info(format!("File overwritten: {}", output.display()));
        }
        Ok(updated)
    })();

    match &result {
        Ok(n) => log.success(format!("{} rows updated successfully (column: {})", n, column)),
        Err(e) => log.error(format!("Failed to update {}: {}", path.display(), e)),
    }
    result
}
