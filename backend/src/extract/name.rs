//! Personalization name extraction from order-line comments.
//!
//! The checkout form appends a line such as
//! `שם הילד שיודפס על גבי המדבקות: יוסי` to the comment field. The phrase
//! comes in several spellings (child / daughter / son, with or without `ם`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::NAME_PLACEHOLDER;

/// Backslash left in front of a Hebrew letter by some exports.
static STRAY_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\u{0590}-\u{05FF}])").expect("invalid escape pattern"));

/// The name is the rest of the phrase's own line; the separator never crosses a line break.
static NAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)ש(?:ם)?\s+היל(?:ד|דה|ד/ה|ה)?\s+שיודפס\s+על\s+גבי\s+המדבקות[^\S\r\n]*[:\-]?[^\S\r\n]*([^\n\r]*)",
    )
    .expect("invalid name pattern")
});

/// Form layout where the name is followed by the protective-sticker add-on question.
static NAME_BEFORE_ADDON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)שם הילד/ה שיודפס על גבי המדבקות:\s*(.*?)\s*תוספת מדבקות הגנה")
        .expect("invalid add-on pattern")
});

/// Extract the name to print from a comment.
///
/// - phrase found with text after it → that text, trimmed
/// - phrase found with nothing after it → `" "`
/// - phrase not found → `None`
pub fn extract_personalization_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let cleaned = STRAY_ESCAPE.replace_all(text, "$1");
    let caps = NAME_LINE.captures(&cleaned)?;
    let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    if name.is_empty() {
        Some(NAME_PLACEHOLDER.to_string())
    } else {
        Some(name.to_string())
    }
}

/// Same as [`extract_personalization_name`] for a raw cell; non-text cells yield `None`.
pub fn personalization_name_from_value(value: &Value) -> Option<String> {
    value.as_str().and_then(extract_personalization_name)
}

/// Name written between the name question and the add-on question.
///
/// Returns `""` when the form layout is not found.
pub fn extract_name_before_addon(comments: &str) -> String {
    NAME_BEFORE_ADDON
        .captures(comments)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
