//! Domain models for sticker order processing.
//!
//! - [`OrderRecord`] - Normalized record produced per order line
//! - [`FieldMapping`] - External column name → internal field name
//! - [`DesignVariant`] - Design family plus size or font, as printed
//! - [`SizeToken`] - Sticker size component of a variant

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// Field Names
// =============================================================================

/// Internal field holding the (extracted) item name.
pub const ITEM_NAME: &str = "itemName";

/// Internal field holding the personalization name.
pub const NAME: &str = "name";

/// Internal field holding the partner reference number.
pub const REFERENCE_NUMBER: &str = "referenceNumber";

/// Internal field holding the ordered quantity.
pub const QUANTITY: &str = "quantity";

/// Reserved column carrying the stable row identifier.
pub const ID_COLUMN: &str = "dbId";

/// Value stored in `name` when no personalization was resolved.
pub const NAME_PLACEHOLDER: &str = " ";

// =============================================================================
// Order Record
// =============================================================================

/// A normalized order line.
///
/// Fields keep insertion order, which is also the order they are exported in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRecord(Map<String, Value>);

impl OrderRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `itemName` when it holds text.
    pub fn item_name(&self) -> Option<&str> {
        self.get(ITEM_NAME).and_then(Value::as_str)
    }

    /// Personalization name when it holds text.
    pub fn name(&self) -> Option<&str> {
        self.get(NAME).and_then(Value::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for OrderRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// =============================================================================
// Field Mapping
// =============================================================================

/// Ordered mapping from export column names to record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn new<I, A, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(column, field)| (column.into(), field.into()))
                .collect(),
        }
    }

    /// `(column, field)` pairs in mapping order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }

    pub fn columns(&self) -> Vec<String> {
        self.entries.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Whether some column maps to `field`.
    pub fn maps_to(&self, field: &str) -> bool {
        self.entries.iter().any(|(_, f)| f == field)
    }
}

impl Default for FieldMapping {
    /// Columns of the shop's order-line export.
    fn default() -> Self {
        Self::new([
            ("Business Partner Reference Number", REFERENCE_NUMBER),
            ("Item Name", ITEM_NAME),
            ("Quantity", QUANTITY),
            ("Line Comments", NAME),
        ])
    }
}

// =============================================================================
// Design Variant
// =============================================================================

/// Size component of a design variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeToken {
    /// Single sheet size, e.g. `90`
    Digits(String),
    /// Combined pack, e.g. `52+90`
    Pair(String, String),
    /// Size not stated in the line text
    Unknown,
}

impl SizeToken {
    /// Parse `"52"` or `"52+90"`; anything else is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let is_digits = |s: &str| !s.is_empty() && s.chars().all(char::is_numeric);
        match raw.split_once('+') {
            Some((a, b)) if is_digits(a) && is_digits(b) => SizeToken::Pair(a.to_string(), b.to_string()),
            None if is_digits(raw) => SizeToken::Digits(raw.to_string()),
            _ => SizeToken::Unknown,
        }
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeToken::Digits(d) => f.write_str(d),
            SizeToken::Pair(a, b) => write!(f, "{}+{}", a, b),
            SizeToken::Unknown => f.write_str("unknown"),
        }
    }
}

/// Design family extracted from an item line.
///
/// Renders as `design_size` (e.g. `חברים_52+90`) or `design font`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignVariant {
    Sized { design: String, size: SizeToken },
    Font { design: String, font: String },
}

impl DesignVariant {
    pub fn design(&self) -> &str {
        match self {
            DesignVariant::Sized { design, .. } | DesignVariant::Font { design, .. } => design,
        }
    }
}

impl fmt::Display for DesignVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignVariant::Sized { design, size } => write!(f, "{}_{}", design, size),
            DesignVariant::Font { design, font } => write!(f, "{} {}", design, font),
        }
    }
}
