//! Split combined-size packs into one record per sheet size.
//!
//! A `52+90` pack is printed as two separate sheets, so the print queue needs
//! two records. No other size combination is split.

use serde_json::Value;

use crate::models::{OrderRecord, ITEM_NAME};

/// Item-name suffix of the combined 52 + 90 pack.
pub const COMBINED_PACK: &str = "_52+90";

/// Sizes the combined pack is split into, in output order.
const PACK_PARTS: [&str; 2] = ["_52", "_90"];

/// Expand a record into its printable variants.
///
/// Returns two records (`_52` then `_90`) when `itemName` contains
/// [`COMBINED_PACK`], otherwise the record itself. Other fields are copied.
pub fn split_variants(record: OrderRecord) -> Vec<OrderRecord> {
    let combined = record
        .item_name()
        .filter(|n| n.contains(COMBINED_PACK))
        .map(str::to_string);
    let Some(item_name) = combined else {
        return vec![record];
    };

    PACK_PARTS
        .iter()
        .map(|part| {
            let mut variant = record.clone();
            variant.insert(ITEM_NAME, Value::String(item_name.replace(COMBINED_PACK, part)));
            variant
        })
        .collect()
}
