//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw or normalized field value.
///
/// Drafts arrive from the presentation layer as loosely typed JSON, so the
/// variants mirror what a front end can send rather than the field's rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    /// Bare JSON number; coerced to text or a flag by the field's rule
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
}

/// One record of a step: field name → value
pub type Record = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Create a list value
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Get the text value (returns None for non-text fields)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean value (returns None for non-boolean fields)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the list value (returns None for non-list fields)
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True when the value counts as "not provided": null or whitespace-only text.
    /// An empty list is a provided value; item counts are a separate constraint.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) | FieldValue::List(_) => false,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(true) => "Так".to_string(),
            FieldValue::Bool(false) => "Ні".to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Build a record from `(name, value)` pairs
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::text("   ").is_blank());
        assert!(!FieldValue::text("x").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert!(!FieldValue::List(vec![]).is_blank());
        assert!(!FieldValue::from(0).is_blank());
    }

    #[test]
    fn test_deserialize_untagged() {
        let json = r#"{"a": null, "b": true, "c": "text", "d": ["A", "B"], "e": 12345}"#;
        let parsed: Record = serde_json::from_str(json).unwrap();
        assert_eq!(parsed["a"], FieldValue::Null);
        assert_eq!(parsed["b"], FieldValue::Bool(true));
        assert_eq!(parsed["c"], FieldValue::text("text"));
        assert_eq!(parsed["d"], FieldValue::list(["A", "B"]));
        assert_eq!(parsed["e"], FieldValue::from(12345));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(FieldValue::Bool(true).display_value(), "Так");
        assert_eq!(FieldValue::list(["A", "C"]).display_value(), "A, C");
        assert_eq!(FieldValue::Null.display_value(), "");
        assert_eq!(FieldValue::from(42).display_value(), "42");
    }

    #[test]
    fn test_record_builder() {
        let r = record([("number", FieldValue::text("12345")), ("active", true.into())]);
        assert_eq!(r.len(), 2);
        assert_eq!(r["active"].as_bool(), Some(true));
    }
}
