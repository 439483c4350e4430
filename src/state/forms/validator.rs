//! Generic schema validator
//!
//! Each field goes through presence, type coercion, format constraints and
//! finally membership checks (enum sets and patterns). The first failure is
//! the only one reported for that field; other fields are still checked.

use super::field::{FieldValue, Record};
use super::schema::{Constraint, FieldKind, FieldRule, Schema};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Canonical date format of normalized records
pub const DATE_FORMAT: &str = "%d-%m-%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Field path → message of the first violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Absorb the errors of one list item under `items[index].`
    pub fn nest_item(&mut self, index: usize, item: FieldErrors) {
        for (field, message) in item.0 {
            self.0.insert(item_path(index, &field), message);
        }
    }
}

/// Path of a field inside a list-cardinality step
pub fn item_path(index: usize, field: &str) -> String {
    format!("items[{index}].{field}")
}

/// Validate a record against a schema, using today's local date
pub fn validate(schema: &Schema, record: &Record) -> Result<Record, FieldErrors> {
    Validator::default().validate_record(schema, record)
}

/// Schema interpreter. Holds the reference date for `NotInFuture` checks so
/// that validation stays a pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    today: NaiveDate,
}

impl Default for Validator {
    fn default() -> Self {
        Self::at(Local::now().date_naive())
    }
}

/// Value after type coercion, before normalization
enum Typed {
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    List(Vec<String>),
    Opaque(FieldValue),
}

impl Typed {
    fn into_value(self) -> FieldValue {
        match self {
            Typed::Text(s) => FieldValue::Text(s),
            Typed::Bool(b) => FieldValue::Bool(b),
            Typed::Date(d) => FieldValue::Text(d.format(DATE_FORMAT).to_string()),
            Typed::List(items) => FieldValue::List(items),
            Typed::Opaque(v) => v,
        }
    }
}

impl Validator {
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validate one record. Fields unknown to the schema are dropped from the
    /// normalized output.
    pub fn validate_record(&self, schema: &Schema, record: &Record) -> Result<Record, FieldErrors> {
        let mut normalized = Record::new();
        let mut errors = FieldErrors::default();

        for rule in schema.rules() {
            match self.validate_field(rule, record.get(&rule.name)) {
                Ok(value) => {
                    normalized.insert(rule.name.clone(), value);
                }
                Err(message) => errors.insert(rule.name.as_str(), message),
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    /// Validate every item independently; succeeds only if all items pass
    pub fn validate_items<'a, I>(&self, schema: &Schema, items: I) -> Result<Vec<Record>, FieldErrors>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut accepted = Vec::new();
        let mut errors = FieldErrors::default();

        for (index, item) in items.into_iter().enumerate() {
            match self.validate_record(schema, item) {
                Ok(record) => accepted.push(record),
                Err(item_errors) => errors.nest_item(index, item_errors),
            }
        }

        if errors.is_empty() {
            Ok(accepted)
        } else {
            Err(errors)
        }
    }

    /// Run one field through all stages, returning the normalized value or the
    /// first failing message
    pub fn validate_field(&self, rule: &FieldRule, raw: Option<&FieldValue>) -> Result<FieldValue, String> {
        let raw = raw.unwrap_or(&FieldValue::Null);

        if raw.is_blank() {
            return match &rule.required {
                Some(message) => Err(message.clone()),
                None => Ok(rule.kind.empty_value()),
            };
        }

        let typed = coerce(&rule.kind, raw).ok_or_else(|| rule.invalid_message.clone())?;

        for check in rule.ordered_checks() {
            if !self.satisfies(&check.constraint, &typed) {
                return Err(check.message.clone());
            }
        }

        if !is_member(&rule.kind, &typed) {
            return Err(rule.invalid_message.clone());
        }

        Ok(typed.into_value())
    }

    fn satisfies(&self, constraint: &Constraint, value: &Typed) -> bool {
        match (constraint, value) {
            (Constraint::MinLength(min), Typed::Text(s)) => s.chars().count() >= *min,
            (Constraint::ExactLength(len), Typed::Text(s)) => s.chars().count() == *len,
            (Constraint::MinItems(min), Typed::List(items)) => items.len() >= *min,
            (Constraint::NotInFuture, Typed::Date(date)) => *date <= self.today,
            (Constraint::Pattern(pattern), Typed::Text(s)) => pattern.is_match(s),
            // constraint does not apply to this value type
            _ => true,
        }
    }
}

fn coerce(kind: &FieldKind, raw: &FieldValue) -> Option<Typed> {
    match (kind, raw) {
        (FieldKind::Opaque, value) => Some(Typed::Opaque(value.clone())),
        (FieldKind::String | FieldKind::Enum(_), FieldValue::Text(s)) => {
            Some(Typed::Text(s.trim().to_string()))
        }
        (FieldKind::String | FieldKind::Enum(_), FieldValue::Number(n)) => {
            Some(Typed::Text(n.to_string()))
        }
        (FieldKind::Boolean, FieldValue::Bool(b)) => Some(Typed::Bool(*b)),
        (FieldKind::Boolean, FieldValue::Text(s)) => parse_bool(s).map(Typed::Bool),
        (FieldKind::Boolean, FieldValue::Number(n)) => parse_bool(&n.to_string()).map(Typed::Bool),
        (FieldKind::DateString, FieldValue::Text(s)) => parse_date(s).map(Typed::Date),
        (FieldKind::StringArray(_), FieldValue::List(items)) => {
            let mut normalized: Vec<String> = Vec::with_capacity(items.len());
            for item in items.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
                if !normalized.iter().any(|n| n == item) {
                    normalized.push(item.to_string());
                }
            }
            Some(Typed::List(normalized))
        }
        _ => None,
    }
}

fn is_member(kind: &FieldKind, value: &Typed) -> bool {
    match (kind, value) {
        (FieldKind::Enum(allowed), Typed::Text(s)) => allowed.iter().any(|a| a == s),
        (FieldKind::StringArray(allowed), Typed::List(items)) => {
            allowed.is_empty() || items.iter().all(|i| allowed.contains(i))
        }
        _ => true,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "так" | "1" => Some(true),
        "false" | "no" | "ні" | "0" => Some(false),
        _ => None,
    }
}

/// Parse `DD-MM-YYYY` or ISO `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, ISO_DATE_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::record;

    fn today() -> Validator {
        Validator::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn phone_rule() -> FieldRule {
        FieldRule::string("phone", "Телефон")
            .required("Обов'язкове поле")
            .pattern(r"^\d+$", "Будь ласка введіть правильний номер")
            .unwrap()
            .exact_len(10, "Номер телефону має 10 цифр")
    }

    mod presence {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_missing_required_field() {
            let rule = FieldRule::string("firstName", "Ім'я").required("Обов'язкове поле");
            assert_eq!(
                today().validate_field(&rule, None),
                Err("Обов'язкове поле".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("  "))),
                Err("Обов'язкове поле".to_string())
            );
        }

        #[test]
        fn test_optional_field_normalizes_to_empty() {
            let text = FieldRule::string("additionalInfo", "Інше");
            let list = FieldRule::string_array("militaryType", "Тип", ["ARMY"]);
            assert_eq!(today().validate_field(&text, None), Ok(FieldValue::text("")));
            assert_eq!(today().validate_field(&list, None), Ok(FieldValue::List(vec![])));
        }

        #[test]
        fn test_presence_checked_before_type() {
            let rule = FieldRule::boolean("hasCrime", "Судимість").required("Обов'язкове поле");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::Null)),
                Err("Обов'язкове поле".to_string())
            );
        }
    }

    mod coercion {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_strings_are_trimmed() {
            let rule = FieldRule::string("lastName", "Прізвище").min_len(2, "short");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("  Шевченко "))),
                Ok(FieldValue::text("Шевченко"))
            );
        }

        #[test]
        fn test_length_measured_after_trim() {
            let rule = FieldRule::string("lastName", "Прізвище").min_len(2, "short");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text(" a "))),
                Err("short".to_string())
            );
        }

        #[test]
        fn test_boolean_literals() {
            let rule = FieldRule::boolean("active", "Активне").invalid("bad");
            for (raw, expected) in [("true", true), ("Так", true), ("no", false), ("ні", false)] {
                assert_eq!(
                    today().validate_field(&rule, Some(&FieldValue::text(raw))),
                    Ok(FieldValue::Bool(expected))
                );
            }
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("maybe"))),
                Err("bad".to_string())
            );
        }

        #[test]
        fn test_dates_normalize_to_canonical_form() {
            let rule = FieldRule::date("birthday", "Дата народження");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("1990-03-07"))),
                Ok(FieldValue::text("07-03-1990"))
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("07-03-1990"))),
                Ok(FieldValue::text("07-03-1990"))
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("31-02-1990"))),
                Err(crate::state::forms::schema::DEFAULT_INVALID_MESSAGE.to_string())
            );
        }

        #[test]
        fn test_type_mismatch_uses_invalid_message() {
            let rule = FieldRule::string("number", "Номер").invalid("not text");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::Bool(true))),
                Err("not text".to_string())
            );
        }

        #[test]
        fn test_numbers_coerce_by_rule() {
            let number = FieldRule::string("number", "Номер").min_len(5, "short");
            assert_eq!(
                today().validate_field(&number, Some(&FieldValue::from(12345))),
                Ok(FieldValue::text("12345"))
            );
            assert_eq!(
                today().validate_field(&number, Some(&FieldValue::from(12))),
                Err("short".to_string())
            );

            let flag = FieldRule::boolean("active", "Активне").invalid("bad");
            assert_eq!(
                today().validate_field(&flag, Some(&FieldValue::from(1))),
                Ok(FieldValue::Bool(true))
            );
            assert_eq!(
                today().validate_field(&flag, Some(&FieldValue::from(7))),
                Err("bad".to_string())
            );

            let date = FieldRule::date("birthday", "Дата").invalid("bad date");
            assert_eq!(
                today().validate_field(&date, Some(&FieldValue::from(19900307))),
                Err("bad date".to_string())
            );
        }

        #[test]
        fn test_opaque_passes_through_untouched() {
            let rule = FieldRule::opaque("photoUrl", "Фото").required("upload");
            let value = FieldValue::text(" data:image/png;base64,AAAA ");
            assert_eq!(today().validate_field(&rule, Some(&value)), Ok(value.clone()));
            assert_eq!(today().validate_field(&rule, None), Err("upload".to_string()));
        }
    }

    mod constraints {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_first_failure_wins() {
            let rule = phone_rule();
            // too short and not digits: length runs before the pattern
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("12ab"))),
                Err("Номер телефону має 10 цифр".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("12345abcde"))),
                Err("Будь ласка введіть правильний номер".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("0501234567"))),
                Ok(FieldValue::text("0501234567"))
            );
        }

        #[test]
        fn test_enum_membership() {
            let rule = FieldRule::one_of("familyStatus", "Статус", ["active", "inactive"]).invalid("choose");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("gone"))),
                Err("choose".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("active"))),
                Ok(FieldValue::text("active"))
            );
        }

        #[test]
        fn test_string_array_items_and_count() {
            let rule = FieldRule::string_array("categories", "Категорії", ["A", "B", "C", "D"])
                .required("required")
                .min_items(1, "Виберіть хоча б одну категорію")
                .invalid("unknown category");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::List(vec![]))),
                Err("Виберіть хоча б одну категорію".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::list(["A", "Z"]))),
                Err("unknown category".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::list(["B", " A", "B"]))),
                Ok(FieldValue::list(["B", "A"]))
            );
        }

        #[test]
        fn test_not_in_future() {
            let rule = FieldRule::date("applyDate", "Дата видачі").not_in_future("future");
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("16-06-2024"))),
                Err("future".to_string())
            );
            assert_eq!(
                today().validate_field(&rule, Some(&FieldValue::text("15-06-2024"))),
                Ok(FieldValue::text("15-06-2024"))
            );
        }
    }

    mod records {
        use super::*;
        use pretty_assertions::assert_eq;

        fn schema() -> Schema {
            Schema::new(vec![
                FieldRule::string("number", "Номер").min_len(5, "Номер занадто короткий"),
                phone_rule(),
            ])
            .unwrap()
        }

        #[test]
        fn test_errors_only_for_violated_fields() {
            let draft = record([("number", "12"), ("phone", "0501234567")]);
            let errors = today().validate_record(&schema(), &draft).unwrap_err();
            assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["number"]);
            assert_eq!(errors.get("number"), Some("Номер занадто короткий"));
        }

        #[test]
        fn test_unknown_fields_are_dropped() {
            let draft = record([("number", "12345"), ("phone", "0501234567"), ("extra", "x")]);
            let normalized = today().validate_record(&schema(), &draft).unwrap();
            assert!(!normalized.contains_key("extra"));
            assert_eq!(normalized.len(), 2);
        }

        #[test]
        fn test_items_report_nested_paths() {
            let good = record([("number", "12345"), ("phone", "0501234567")]);
            let bad = record([("number", "1"), ("phone", "0501234567")]);
            let errors = today()
                .validate_items(&schema(), [&good, &bad, &good])
                .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get("items[1].number"), Some("Номер занадто короткий"));
        }

        #[test]
        fn test_items_all_pass() {
            let good = record([("number", " 12345 "), ("phone", "0501234567")]);
            let accepted = today().validate_items(&schema(), [&good, &good]).unwrap();
            assert_eq!(accepted.len(), 2);
            assert_eq!(accepted[0]["number"], FieldValue::text("12345"));
        }
    }
}
