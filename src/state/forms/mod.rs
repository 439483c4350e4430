//! Form domain layer
//!
//! Field values, declarative rules, the generic validator, repeatable record
//! lists and the per-step controller.

mod field;
mod record_list;
mod schema;
mod step;
mod validator;

pub use field::{record, FieldValue, Record};
pub use record_list::{
    AddedItem, DraftFactory, ItemId, ListError, RecordList, RecordListItem, ID_FIELD,
};
pub use schema::{
    Check, Constraint, FieldKind, FieldRule, Pattern, Schema, Stage, DEFAULT_INVALID_MESSAGE,
};
pub use step::{
    Cardinality, DraftView, StepController, StepData, StepDefinition, StepInput, StepOutcome,
    StepStatus,
};
pub use validator::{item_path, parse_date, validate, FieldErrors, Validator, DATE_FORMAT};
