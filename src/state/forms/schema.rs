//! Declarative field rules
//!
//! A [`Schema`] is an ordered list of [`FieldRule`]s. Rules carry data only;
//! the interpretation lives in the validator so that any step can compose its
//! own rule set without touching validation code.

use super::field::FieldValue;
use crate::error::WizardError;
use regex::Regex;
use serde::{Serialize, Serializer};

/// Value type a field is coerced to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "allowed", rename_all = "kebab-case")]
pub enum FieldKind {
    String,
    Boolean,
    /// Single choice out of a fixed set
    Enum(Vec<String>),
    /// Calendar date, normalized to `DD-MM-YYYY`
    DateString,
    /// Multi-select; an empty set accepts any item
    StringArray(Vec<String>),
    /// Pass-through value filled in by an external collaborator
    Opaque,
}

impl FieldKind {
    /// Normalized value of an optional field that was left empty
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldKind::String => FieldValue::Text(String::new()),
            FieldKind::StringArray(_) => FieldValue::List(Vec::new()),
            _ => FieldValue::Null,
        }
    }
}

/// Compiled regular expression that compares and serializes by its source
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Stage at which a constraint runs, after presence and type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Format,
    Membership,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Constraint {
    /// Minimum number of characters after trimming
    MinLength(usize),
    /// Exact number of characters after trimming
    ExactLength(usize),
    /// Minimum number of selected items
    MinItems(usize),
    /// Date must not be after today
    NotInFuture,
    /// Whole value must match
    Pattern(Pattern),
}

impl Constraint {
    pub fn stage(&self) -> Stage {
        match self {
            Constraint::Pattern(_) => Stage::Membership,
            _ => Stage::Format,
        }
    }
}

/// A constraint with the message reported when it fails
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    #[serde(flatten)]
    pub constraint: Constraint,
    pub message: String,
}

pub const DEFAULT_INVALID_MESSAGE: &str = "Невірне значення";

/// Rule set for a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Message reported when the field is missing; `None` makes it optional
    pub required: Option<String>,
    /// Message reported on type or enum membership failures
    pub invalid_message: String,
    pub checks: Vec<Check>,
}

impl FieldRule {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: None,
            invalid_message: DEFAULT_INVALID_MESSAGE.to_string(),
            checks: Vec::new(),
        }
    }

    /// Create a free text field
    pub fn string(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::String)
    }

    /// Create a yes/no field
    pub fn boolean(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Boolean)
    }

    /// Create a single choice field
    pub fn one_of<I, S>(name: &str, label: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            label,
            FieldKind::Enum(allowed.into_iter().map(Into::into).collect()),
        )
    }

    /// Create a date field
    pub fn date(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::DateString)
    }

    /// Create a multi-select field
    pub fn string_array<I, S>(name: &str, label: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            label,
            FieldKind::StringArray(allowed.into_iter().map(Into::into).collect()),
        )
    }

    /// Create a pass-through field
    pub fn opaque(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Opaque)
    }

    pub fn required(mut self, message: &str) -> Self {
        self.required = Some(message.to_string());
        self
    }

    pub fn invalid(mut self, message: &str) -> Self {
        self.invalid_message = message.to_string();
        self
    }

    pub fn check(mut self, constraint: Constraint, message: &str) -> Self {
        self.checks.push(Check {
            constraint,
            message: message.to_string(),
        });
        self
    }

    pub fn min_len(self, min: usize, message: &str) -> Self {
        self.check(Constraint::MinLength(min), message)
    }

    pub fn exact_len(self, len: usize, message: &str) -> Self {
        self.check(Constraint::ExactLength(len), message)
    }

    pub fn min_items(self, min: usize, message: &str) -> Self {
        self.check(Constraint::MinItems(min), message)
    }

    pub fn not_in_future(self, message: &str) -> Self {
        self.check(Constraint::NotInFuture, message)
    }

    /// Add a regex constraint; the pattern is compiled here
    pub fn pattern(self, pattern: &str, message: &str) -> Result<Self, WizardError> {
        let compiled = Pattern::new(pattern).map_err(|e| {
            WizardError::InvalidPlan(format!("field `{}` pattern: {e}", self.name))
        })?;
        Ok(self.check(Constraint::Pattern(compiled), message))
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }

    /// Checks in evaluation order: format constraints first, then membership
    pub fn ordered_checks(&self) -> impl Iterator<Item = &Check> {
        let mut checks: Vec<&Check> = self.checks.iter().collect();
        // stable sort keeps declaration order within a stage
        checks.sort_by_key(|c| c.constraint.stage());
        checks.into_iter()
    }
}

/// Ordered set of field rules for one record
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, WizardError> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|r| r.name == rule.name) {
                return Err(WizardError::InvalidPlan(format!(
                    "field `{}` is declared twice",
                    rule.name
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
