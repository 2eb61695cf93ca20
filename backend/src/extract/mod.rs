//! Structured fields from free-text order lines.
//!
//! - [`design`] - Design family and size from the item name
//! - [`name`] - Personalization name from the line comments
//!
//! Extraction never fails: text that matches no known phrasing yields `None`
//! and the caller keeps the raw text.

pub mod design;
pub mod name;

pub use design::{design_rules, design_variant_from_value, extract_design_variant, DesignRule};
pub use name::{extract_name_before_addon, extract_personalization_name, personalization_name_from_value};
