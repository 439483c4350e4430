//! Step definitions and the per-step controller

use super::field::{FieldValue, Record};
use super::record_list::{
    AddedItem, DraftFactory, ItemId, ListError, RecordList, RecordListItem, ID_FIELD,
};
use super::schema::Schema;
use super::validator::{FieldErrors, Validator};
use crate::error::WizardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Whether a step holds one record or an ordered list of at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    List,
}

/// Static description of one wizard step
#[derive(Clone)]
pub struct StepDefinition {
    pub name: String,
    pub title: String,
    pub schema: Schema,
    pub cardinality: Cardinality,
    pub initial_draft: DraftFactory,
    /// Field the presentation layer may fill directly (e.g. a photo reference)
    pub opaque_field: Option<String>,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("schema", &self.schema)
            .field("opaque_field", &self.opaque_field)
            .finish_non_exhaustive()
    }
}

impl StepDefinition {
    pub fn new(
        name: &str,
        title: &str,
        schema: Schema,
        cardinality: Cardinality,
        initial_draft: impl Fn() -> Record + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            schema,
            cardinality,
            initial_draft: Arc::new(initial_draft),
            opaque_field: None,
        }
    }

    /// Designate a pass-through field of a single-record step. It must be
    /// declared in the schema.
    pub fn with_opaque_field(mut self, field: &str) -> Result<Self, WizardError> {
        if self.cardinality == Cardinality::List {
            return Err(WizardError::InvalidPlan(format!(
                "list step `{}` cannot take an opaque field",
                self.name
            )));
        }
        if self.schema.rule(field).is_none() {
            return Err(WizardError::InvalidPlan(format!(
                "opaque field `{field}` is not part of step `{}`",
                self.name
            )));
        }
        self.opaque_field = Some(field.to_string());
        Ok(self)
    }
}

/// Validated data of a step as stored in the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepData {
    Single(Record),
    List(Vec<Record>),
}

impl StepData {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            StepData::Single(_) => Cardinality::Single,
            StepData::List(_) => Cardinality::List,
        }
    }
}

/// Draft(s) handed to `submit_step`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepInput {
    Single(Record),
    List(Vec<Record>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Editing,
    Validating,
    Accepted,
}

/// Result of a step submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted(StepData),
    Rejected(FieldErrors),
}

/// Draft(s) owned by a controller, as exposed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DraftView {
    Single(Record),
    List(Vec<RecordListItem>),
}

#[derive(Debug, Clone)]
enum Draft {
    Single(Record),
    List(RecordList),
}

/// Owns the draft of the current step until it is accepted
#[derive(Debug, Clone)]
pub struct StepController {
    definition: Arc<StepDefinition>,
    draft: Draft,
    status: StepStatus,
    errors: FieldErrors,
}

impl StepController {
    pub fn new(definition: Arc<StepDefinition>) -> Self {
        let draft = match definition.cardinality {
            Cardinality::Single => Draft::Single((definition.initial_draft)()),
            Cardinality::List => Draft::List(RecordList::new(definition.initial_draft.clone())),
        };
        Self {
            definition,
            draft,
            status: StepStatus::Editing,
            errors: FieldErrors::default(),
        }
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Errors of the last rejected submission
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn draft_view(&self) -> DraftView {
        match &self.draft {
            Draft::Single(record) => DraftView::Single(record.clone()),
            Draft::List(list) => DraftView::List(list.snapshot()),
        }
    }

    /// Merge a partial update into a single-record draft
    pub fn update_draft(&mut self, patch: Record) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let mismatch = self.mismatch();
        match &mut self.draft {
            Draft::Single(record) => {
                record.extend(patch);
                Ok(())
            }
            Draft::List(_) => Err(mismatch),
        }
    }

    pub fn add_item(&mut self) -> Result<AddedItem, WizardError> {
        self.ensure_editing()?;
        let list = self.list_mut()?;
        Ok(list.add())
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Record, WizardError> {
        self.ensure_editing()?;
        let name = self.definition.name.clone();
        let list = self.list_mut()?;
        list.remove(id).map_err(|e| list_error(&name, e))
    }

    pub fn update_item(&mut self, id: ItemId, patch: Record) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let name = self.definition.name.clone();
        let list = self.list_mut()?;
        list.update(id, patch).map_err(|e| list_error(&name, e))
    }

    pub fn item_id(&self, index: usize) -> Option<ItemId> {
        match &self.draft {
            Draft::List(list) => list.id_at(index),
            Draft::Single(_) => None,
        }
    }

    /// Set the designated pass-through field
    pub fn set_opaque(&mut self, value: FieldValue) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let field = self
            .definition
            .opaque_field
            .clone()
            .ok_or_else(|| WizardError::OpaqueFieldNotAllowed {
                step: self.definition.name.clone(),
            })?;
        let mismatch = self.mismatch();
        match &mut self.draft {
            Draft::Single(record) => {
                record.insert(field, value);
                Ok(())
            }
            Draft::List(_) => Err(mismatch),
        }
    }

    /// Replace the held draft(s) with `input`. A previously injected opaque
    /// value survives when the input does not carry the field.
    pub fn replace_draft(&mut self, input: StepInput) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let name = self.definition.name.clone();
        let opaque_field = self.definition.opaque_field.clone();
        match (&mut self.draft, input) {
            (Draft::Single(current), StepInput::Single(mut record)) => {
                if let Some(field) = &opaque_field {
                    if !record.contains_key(field) {
                        if let Some(value) = current.get(field) {
                            record.insert(field.clone(), value.clone());
                        }
                    }
                }
                *current = record;
                Ok(())
            }
            (Draft::List(list), StepInput::List(records)) => {
                list.replace_all(records).map_err(|e| list_error(&name, e))
            }
            _ => Err(WizardError::CardinalityMismatch { step: name }),
        }
    }

    /// Validate the held draft(s). On rejection the controller goes back to
    /// `Editing` with the errors attached; acceptance is final.
    pub fn submit(&mut self, validator: &Validator) -> Result<StepOutcome, WizardError> {
        self.ensure_editing()?;
        self.status = StepStatus::Validating;

        let schema = &self.definition.schema;
        let result = match &self.draft {
            Draft::Single(record) => validator.validate_record(schema, record).map(|mut r| {
                r.insert(ID_FIELD.to_string(), FieldValue::Text(Uuid::new_v4().to_string()));
                StepData::Single(r)
            }),
            Draft::List(list) => validator.validate_items(schema, list.records()).map(|records| {
                StepData::List(
                    list.ids()
                        .zip(records)
                        .map(|(id, mut r)| {
                            r.insert(ID_FIELD.to_string(), FieldValue::Text(id.to_string()));
                            r
                        })
                        .collect(),
                )
            }),
        };

        match result {
            Ok(data) => {
                self.status = StepStatus::Accepted;
                self.errors = FieldErrors::default();
                Ok(StepOutcome::Accepted(data))
            }
            Err(errors) => {
                self.status = StepStatus::Editing;
                self.errors = errors.clone();
                Ok(StepOutcome::Rejected(errors))
            }
        }
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.status {
            StepStatus::Editing => Ok(()),
            // an accepted step has handed its data over; further commands are stale
            _ => Err(WizardError::OutOfSequenceTransition {
                requested: self.definition.name.clone(),
                current: self.definition.name.clone(),
            }),
        }
    }

    fn list_mut(&mut self) -> Result<&mut RecordList, WizardError> {
        let mismatch = self.mismatch();
        match &mut self.draft {
            Draft::List(list) => Ok(list),
            Draft::Single(_) => Err(mismatch),
        }
    }

    fn mismatch(&self) -> WizardError {
        WizardError::CardinalityMismatch {
            step: self.definition.name.clone(),
        }
    }
}

fn list_error(step: &str, error: ListError) -> WizardError {
    match error {
        ListError::UnknownItem(id) => WizardError::UnknownItem(id),
        ListError::MinimumCardinality => WizardError::MinimumCardinalityViolation {
            step: step.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::record;
    use crate::state::forms::schema::FieldRule;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn validator() -> Validator {
        Validator::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn license_step() -> Arc<StepDefinition> {
        let schema = Schema::new(vec![
            FieldRule::string("number", "Номер").min_len(5, "Номер занадто короткий"),
        ])
        .unwrap();
        Arc::new(StepDefinition::new(
            "licenses",
            "Посвідчення",
            schema,
            Cardinality::List,
            || record([("number", "")]),
        ))
    }

    fn profile_step() -> Arc<StepDefinition> {
        let schema = Schema::new(vec![
            FieldRule::string("name", "Ім'я").required("Обов'язкове поле"),
            FieldRule::opaque("photo", "Фото").required("Завантажте фото"),
        ])
        .unwrap();
        Arc::new(
            StepDefinition::new("profile", "Профіль", schema, Cardinality::Single, Record::new)
                .with_opaque_field("photo")
                .unwrap(),
        )
    }

    #[test]
    fn test_opaque_field_must_exist_in_schema() {
        let step = StepDefinition::new(
            "profile",
            "Профіль",
            Schema::default(),
            Cardinality::Single,
            Record::new,
        );
        assert!(matches!(
            step.with_opaque_field("photo"),
            Err(WizardError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_list_step_cannot_take_opaque_field() {
        let schema = Schema::new(vec![FieldRule::opaque("scan", "Скан")]).unwrap();
        let step = StepDefinition::new("licenses", "Посвідчення", schema, Cardinality::List, Record::new);
        assert!(matches!(
            step.with_opaque_field("scan"),
            Err(WizardError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_numeric_draft_is_a_field_error() {
        let input: StepInput = serde_json::from_str(r#"[{"number": 12}, {"number": 12345}]"#).unwrap();
        let mut controller = StepController::new(license_step());
        controller.replace_draft(input).unwrap();

        let StepOutcome::Rejected(errors) = controller.submit(&validator()).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["items[0].number"]);
        assert_eq!(errors.get("items[0].number"), Some("Номер занадто короткий"));
    }

    #[test]
    fn test_rejected_submission_returns_to_editing() {
        let mut controller = StepController::new(license_step());
        let id = controller.item_id(0).unwrap();
        controller.update_item(id, record([("number", "12")])).unwrap();

        let outcome = controller.submit(&validator()).unwrap();
        let StepOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(errors.get("items[0].number"), Some("Номер занадто короткий"));
        assert_eq!(controller.status(), StepStatus::Editing);
        assert_eq!(controller.errors(), &errors);
    }

    #[test]
    fn test_accepted_list_items_carry_identity() {
        let mut controller = StepController::new(license_step());
        let first = controller.item_id(0).unwrap();
        controller.update_item(first, record([("number", "AB12345")])).unwrap();
        let second = controller.add_item().unwrap().id;
        controller.update_item(second, record([("number", "CD67890")])).unwrap();

        let StepOutcome::Accepted(StepData::List(records)) = controller.submit(&validator()).unwrap() else {
            panic!("expected accepted list");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][ID_FIELD], FieldValue::Text(first.to_string()));
        assert_eq!(records[1][ID_FIELD], FieldValue::Text(second.to_string()));
        assert_eq!(controller.status(), StepStatus::Accepted);
    }

    #[test]
    fn test_accepted_step_refuses_further_commands() {
        let mut controller = StepController::new(license_step());
        let id = controller.item_id(0).unwrap();
        controller.update_item(id, record([("number", "12345")])).unwrap();
        controller.submit(&validator()).unwrap();
        assert!(controller.add_item().is_err());
        assert!(controller.submit(&validator()).is_err());
    }

    #[test]
    fn test_list_commands_on_single_step() {
        let mut controller = StepController::new(profile_step());
        assert_eq!(
            controller.add_item(),
            Err(WizardError::CardinalityMismatch {
                step: "profile".to_string()
            })
        );
    }

    #[test]
    fn test_remove_only_item_maps_to_cardinality_violation() {
        let mut controller = StepController::new(license_step());
        let id = controller.item_id(0).unwrap();
        assert_eq!(
            controller.remove_item(id),
            Err(WizardError::MinimumCardinalityViolation {
                step: "licenses".to_string()
            })
        );
    }

    #[test]
    fn test_opaque_value_survives_draft_replacement() {
        let mut controller = StepController::new(profile_step());
        controller
            .set_opaque(FieldValue::text("data:image/png;base64,AAAA"))
            .unwrap();
        controller
            .replace_draft(StepInput::Single(record([("name", "Олена")])))
            .unwrap();

        let StepOutcome::Accepted(StepData::Single(data)) = controller.submit(&validator()).unwrap() else {
            panic!("expected accepted record");
        };
        assert_eq!(data["photo"], FieldValue::text("data:image/png;base64,AAAA"));
        assert!(data.contains_key(ID_FIELD));
    }

    #[test]
    fn test_opaque_field_on_step_without_one() {
        let mut controller = StepController::new(license_step());
        assert_eq!(
            controller.set_opaque(FieldValue::text("x")),
            Err(WizardError::OpaqueFieldNotAllowed {
                step: "licenses".to_string()
            })
        );
    }
}
