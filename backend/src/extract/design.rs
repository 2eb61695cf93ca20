//! Design and size extraction from item-name lines.
//!
//! The shop's product names follow a handful of fixed phrasings. Each
//! phrasing is a [`DesignRule`]; rules are tried in table order and the first
//! match wins.
//!
//! | Rule             | Example line                                         | Result           |
//! |------------------|------------------------------------------------------|------------------|
//! | `prefixed_dash`  | `מדבקות שם - חברים - סט מדבקות 52+90`                 | `חברים_52+90`    |
//! | `background`     | `מדבקות שם קטנות במיוחד - ברקע חד קרן ללא איורים`     | `חד קרן_unknown` |
//! | `dash_suffix`    | `שקופות - קשת בענן ללא איורים 90`                     | `קשת בענן_90`    |
//! | `font_qualifier` | `מדבקות שם - פרפרים - כתב יד`                          | `פרפרים כתב יד`  |

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::models::{DesignVariant, SizeToken};

/// One phrasing of an item line.
pub struct DesignRule {
    /// Stable rule name, used in logs and tests
    pub name: &'static str,
    pattern: Regex,
    build: fn(&Captures, &str) -> DesignVariant,
}

impl DesignRule {
    fn new(name: &'static str, pattern: &str, build: fn(&Captures, &str) -> DesignVariant) -> Self {
        Self {
            name,
            // Patterns are literals checked by the unit tests below.
            pattern: Regex::new(pattern).expect("invalid design rule pattern"),
            build,
        }
    }

    /// Apply this rule alone to already-trimmed text.
    pub fn apply(&self, text: &str) -> Option<DesignVariant> {
        self.pattern.captures(text).map(|caps| (self.build)(&caps, text))
    }
}

/// First size anywhere in the line: `90` or `52+90`.
static ANY_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\+\d+)?").expect("invalid size pattern"));

fn group(caps: &Captures, name: &str) -> String {
    caps.name(name).map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}

fn size_in_line(text: &str) -> SizeToken {
    ANY_SIZE
        .find(text)
        .map(|m| SizeToken::parse(m.as_str()))
        .unwrap_or(SizeToken::Unknown)
}

fn sized_from_quantity(caps: &Captures, _text: &str) -> DesignVariant {
    DesignVariant::Sized {
        design: group(caps, "design"),
        size: SizeToken::parse(&group(caps, "quantity")),
    }
}

fn sized_from_line(caps: &Captures, text: &str) -> DesignVariant {
    DesignVariant::Sized {
        design: group(caps, "design"),
        size: size_in_line(text),
    }
}

fn with_font(caps: &Captures, _text: &str) -> DesignVariant {
    DesignVariant::Font {
        design: group(caps, "design"),
        font: group(caps, "font"),
    }
}

static RULES: Lazy<Vec<DesignRule>> = Lazy::new(|| {
    vec![
        DesignRule::new(
            "prefixed_dash",
            r"^מדבקות שם(?:\s*-\s*.+)*?\s*-\s*(?P<design>[^-]+?)\s*-\s*(?:סט\s+מדבקות\s*)?(?P<quantity>\d+(?:\+\d+)?)",
            sized_from_quantity,
        ),
        DesignRule::new(
            "background",
            r"ברקע\s+(?P<design>.+?)\s+ללא\s+איורים",
            sized_from_line,
        ),
        DesignRule::new(
            "dash_suffix",
            r"-\s*(?P<design>[^-]+?)\s+ללא\s+איורים",
            sized_from_line,
        ),
        DesignRule::new(
            "font_qualifier",
            r"^מדבקות שם\s*-\s*(?P<design>[^-]+?)\s*-\s*(?P<font>כתב\s+\S+)",
            with_font,
        ),
    ]
});

/// The rule table in precedence order.
pub fn design_rules() -> &'static [DesignRule] {
    &RULES
}

/// Extract the design variant from an item line.
///
/// Returns `None` for empty text or text matching no known phrasing.
pub fn extract_design_variant(text: &str) -> Option<DesignVariant> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    RULES.iter().find_map(|rule| rule.apply(text))
}

/// Same as [`extract_design_variant`] for a raw cell; non-text cells yield `None`.
pub fn design_variant_from_value(value: &Value) -> Option<DesignVariant> {
    value.as_str().and_then(extract_design_variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(text: &str) -> Option<String> {
        extract_design_variant(text).map(|v| v.to_string())
    }

    fn rule(name: &str) -> &'static DesignRule {
        design_rules().iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = design_rules().iter().map(|r| r.name).collect();
        assert_eq!(names, ["prefixed_dash", "background", "dash_suffix", "font_qualifier"]);
    }

    #[test]
    fn test_prefixed_dash_with_set_qualifier() {
        assert_eq!(
            extract("מדבקות שם - חברים - סט מדבקות 52+90").as_deref(),
            Some("חברים_52+90")
        );
    }

    #[test]
    fn test_prefixed_dash_with_extra_segments() {
        assert_eq!(
            extract("מדבקות שם - מהדורה מיוחדת - חד קרן - 90").as_deref(),
            Some("חד קרן_90")
        );
    }

    #[test]
    fn test_background_without_size() {
        assert_eq!(
            extract("מדבקות שם קטנות במיוחד - ברקע חד קרן ללא איורים").as_deref(),
            Some("חד קרן_unknown")
        );
    }

    #[test]
    fn test_background_with_size_anywhere() {
        assert_eq!(
            extract("52 מדבקות ברקע ורוד ללא איורים").as_deref(),
            Some("ורוד_52")
        );
    }

    #[test]
    fn test_dash_suffix() {
        assert_eq!(
            extract("שקופות - קשת בענן ללא איורים 90").as_deref(),
            Some("קשת בענן_90")
        );
        assert_eq!(
            extract("שקופות - כוכבים ללא איורים 52+90").as_deref(),
            Some("כוכבים_52+90")
        );
    }

    #[test]
    fn test_font_qualifier() {
        assert_eq!(
            extract("מדבקות שם - פרפרים - כתב יד").as_deref(),
            Some("פרפרים כתב יד")
        );
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert_eq!(
            extract("   מדבקות שם -  חברים  - 90  ").as_deref(),
            Some("חברים_90")
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // Matches both the prefixed form and the font form.
        let line = "מדבקות שם - לבבות - 90 כתב יד";
        assert!(rule("font_qualifier").apply(line).is_none());
        assert_eq!(extract(line).as_deref(), Some("לבבות_90"));

        // Background phrasing also satisfies the dash-suffix rule.
        let line = "שקופות - ברקע תכלת ללא איורים";
        assert!(rule("dash_suffix").apply(line).is_some());
        assert_eq!(extract(line).as_deref(), Some("תכלת_unknown"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
        assert_eq!(extract("לא תואם שום תבנית"), None);
        assert_eq!(extract("Gift card 100"), None);
    }

    #[test]
    fn test_non_text_values() {
        assert_eq!(design_variant_from_value(&json!(12345)), None);
        assert_eq!(design_variant_from_value(&Value::Null), None);
        assert_eq!(
            design_variant_from_value(&json!("שקופות - קשת בענן ללא איורים 90")).map(|v| v.to_string()),
            Some("קשת בענן_90".to_string())
        );
    }
}
