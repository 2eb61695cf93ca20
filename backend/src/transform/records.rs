//! Order rows → normalized records.
//!
//! For every data row:
//!
//! 1. project the mapped columns that exist in the header (short rows just
//!    lose their missing cells),
//! 2. replace `itemName` by the extracted design variant when one is found,
//!    otherwise keep the raw text,
//! 3. replace `name` by the extracted personalization name, or `" "`,
//! 4. split combined packs.
//!
//! Output keeps input order; the two sizes of a split pack are adjacent.

use serde_json::Value;

use super::split::split_variants;
use crate::error::{TransformError, TransformResult};
use crate::extract::{design_variant_from_value, personalization_name_from_value};
use crate::logs::EventLog;
use crate::models::{FieldMapping, OrderRecord, ITEM_NAME, NAME, NAME_PLACEHOLDER};
use crate::table::Dataset;

/// Records plus what happened while producing them.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub records: Vec<OrderRecord>,
    /// Sheet line numbers (header = 1) whose item name matched no phrasing
    pub unparsed_lines: Vec<usize>,
    /// Rows expanded into two size variants
    pub split_rows: usize,
}

impl TransformOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Transformed: {} records, {} item names kept raw, {} packs split",
            self.records.len(),
            self.unparsed_lines.len(),
            self.split_rows
        )
    }
}

/// Transform a dataset into order records.
pub fn transform(dataset: &Dataset, mapping: &FieldMapping) -> TransformResult<Vec<OrderRecord>> {
    transform_detailed(dataset, mapping).map(|outcome| outcome.records)
}

/// Transform a dataset, keeping per-row diagnostics.
///
/// # Errors
/// - [`TransformError::EmptyDataset`] without a header or data rows
/// - [`TransformError::MissingHeaders`] when no mapped column is in the header
///
/// Every data row yields at least one record, so a successful outcome is
/// never empty.
pub fn transform_detailed(dataset: &Dataset, mapping: &FieldMapping) -> TransformResult<TransformOutcome> {
    if dataset.is_empty() {
        return Err(TransformError::EmptyDataset);
    }

    let columns: Vec<(&str, usize)> = mapping
        .entries()
        .filter_map(|(column, field)| dataset.column_index(column).map(|idx| (field, idx)))
        .collect();

    if columns.is_empty() {
        return Err(TransformError::MissingHeaders(mapping.columns()));
    }

    let name_mapped = columns.iter().any(|(field, _)| *field == NAME);
    let mut outcome = TransformOutcome::default();

    for row in 0..dataset.row_count() {
        let mut record = OrderRecord::new();
        for &(field, idx) in &columns {
            if let Some(value) = dataset.cell(row, idx) {
                record.insert(field, value.clone());
            }
        }

        match record.get(ITEM_NAME).and_then(design_variant_from_value) {
            Some(variant) => {
                record.insert(ITEM_NAME, Value::String(variant.to_string()));
            }
            None => outcome.unparsed_lines.push(row + 2),
        }

        if name_mapped {
            let name = record
                .get(NAME)
                .and_then(personalization_name_from_value)
                .unwrap_or_else(|| NAME_PLACEHOLDER.to_string());
            record.insert(NAME, Value::String(name));
        }

        let variants = split_variants(record);
        if variants.len() > 1 {
            outcome.split_rows += 1;
        }
        outcome.records.extend(variants);
    }

    Ok(outcome)
}

/// Transform, reporting "no data" conditions as a warning and `None`.
pub fn transform_soft(dataset: &Dataset, mapping: &FieldMapping, log: &EventLog) -> Option<Vec<OrderRecord>> {
    match transform_detailed(dataset, mapping) {
        Ok(outcome) => {
            log.success(outcome.summary());
            Some(outcome.records)
        }
        Err(e) if e.is_no_data() => {
            log.warning(e.to_string());
            None
        }
        Err(e) => {
            log.error(format!("Failed to transform orders: {}", e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QUANTITY, REFERENCE_NUMBER};
    use serde_json::json;

    fn headers() -> Vec<Value> {
        vec![
            json!("Business Partner Reference Number"),
            json!("Item Name"),
            json!("Quantity"),
            json!("Line Comments"),
        ]
    }

    #[test]
    fn test_basic_flow_splits_and_names() {
        let ds = Dataset::from_rows(vec![
            headers(),
            vec![
                json!("ABC123"),
                json!("מדבקות שם - חד קרן - סט מדבקות 52+90"),
                json!(1),
                json!("שם הילד שיודפס על גבי המדבקות: יוסי"),
            ],
        ]);

        let records = transform(&ds, &FieldMapping::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item_name(), Some("חד קרן_52"));
        assert_eq!(records[1].item_name(), Some("חד קרן_90"));
        assert_eq!(records[0].name(), Some("יוסי"));
        assert_eq!(records[1].get(REFERENCE_NUMBER), Some(&json!("ABC123")));
        assert_eq!(
            records[0].fields().collect::<Vec<_>>(),
            [REFERENCE_NUMBER, ITEM_NAME, QUANTITY, NAME]
        );
    }

    #[test]
    fn test_unparsed_item_name_passes_through() {
        let ds = Dataset::from_rows(vec![
            headers(),
            vec![json!("R1"), json!("כרטיס מתנה"), json!(2), json!("משלוח מהיר")],
        ]);

        let outcome = transform_detailed(&ds, &FieldMapping::default()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].item_name(), Some("כרטיס מתנה"));
        assert_eq!(outcome.records[0].name(), Some(NAME_PLACEHOLDER));
        assert_eq!(outcome.unparsed_lines, vec![2]);
    }

    #[test]
    fn test_ragged_rows_keep_order_and_get_placeholder() {
        let ds = Dataset::from_rows(vec![
            headers(),
            vec![json!("R1"), json!("שקופות - קשת בענן ללא איורים 90")],
            vec![json!("R2")],
            vec![
                json!("R3"),
                json!("מדבקות שם - חברים - 52+90"),
                json!(1),
                json!("שם הילדה שיודפס על גבי המדבקות: שירה"),
            ],
        ]);

        let outcome = transform_detailed(&ds, &FieldMapping::default()).unwrap();
        let items: Vec<_> = outcome.records.iter().map(|r| r.item_name()).collect();
        assert_eq!(
            items,
            [Some("קשת בענן_90"), None, Some("חברים_52"), Some("חברים_90")]
        );
        assert_eq!(outcome.records[0].get(QUANTITY), None);
        assert_eq!(outcome.records[1].fields().collect::<Vec<_>>(), [REFERENCE_NUMBER, NAME]);
        assert_eq!(outcome.records[1].name(), Some(" "));
        assert_eq!(outcome.records[3].name(), Some("שירה"));
        assert_eq!(outcome.split_rows, 1);
    }

    #[test]
    fn test_name_not_added_when_column_unmapped() {
        let ds = Dataset::from_rows(vec![
            vec![json!("Item Name")],
            vec![json!("מדבקות שם - חברים - 90")],
        ]);
        let records = transform(&ds, &FieldMapping::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].contains(NAME));
    }

    #[test]
    fn test_non_text_item_name_kept() {
        let ds = Dataset::from_rows(vec![
            vec![json!("Item Name"), json!("Line Comments")],
            vec![json!(12345), json!(7)],
        ]);
        let records = transform(&ds, &FieldMapping::default()).unwrap();
        assert_eq!(records[0].get(ITEM_NAME), Some(&json!(12345)));
        assert_eq!(records[0].name(), Some(" "));
    }

    #[test]
    fn test_empty_dataset() {
        let only_header = Dataset::from_rows(vec![headers()]);
        assert!(matches!(
            transform(&only_header, &FieldMapping::default()),
            Err(TransformError::EmptyDataset)
        ));
        assert!(matches!(
            transform(&Dataset::default(), &FieldMapping::default()),
            Err(TransformError::EmptyDataset)
        ));
    }

    #[test]
    fn test_every_row_yields_a_record() {
        let ds = Dataset::from_rows(vec![
            vec![json!("Item Name"), json!("Other")],
            vec![],
            vec![Value::Null, json!("x")],
        ]);
        let outcome = transform_detailed(&ds, &FieldMapping::default()).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records[0].is_empty());
        assert_eq!(outcome.records[1].get(ITEM_NAME), Some(&Value::Null));
        assert_eq!(outcome.unparsed_lines, vec![2, 3]);
    }

    #[test]
    fn test_missing_headers_is_soft() {
        let ds = Dataset::from_rows(vec![
            vec![json!("Invalid"), json!("Headers")],
            vec![json!("a"), json!("b")],
        ]);
        assert!(matches!(
            transform(&ds, &FieldMapping::default()),
            Err(TransformError::MissingHeaders(_))
        ));

        let log = EventLog::silent();
        let mut rx = log.subscribe();
        assert!(transform_soft(&ds, &FieldMapping::default(), &log).is_none());
        assert_eq!(rx.try_recv().unwrap().level, crate::logs::LogLevel::Warning);
    }

    #[test]
    fn test_custom_mapping() {
        let ds = Dataset::from_rows(vec![
            vec![json!("Product"), json!("Notes")],
            vec![json!("שקופות - כוכבים ללא איורים 52+90"), json!("")],
        ]);
        let mapping = FieldMapping::new([("Product", ITEM_NAME), ("Notes", NAME)]);
        let records = transform(&ds, &mapping).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].item_name(), Some("כוכבים_90"));
    }
}
