//! Error taxonomy for the wizard core

use crate::state::forms::{FieldErrors, ItemId};
use thiserror::Error;

/// Every failure the core reports. All variants are recoverable; callers decide
/// whether to surface them to the user or drop the offending command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// One or more fields of the current step failed validation
    #[error("step `{step}` has {} invalid field(s)", errors.len())]
    Validation { step: String, errors: FieldErrors },

    /// Removing the item would leave a list step without records
    #[error("step `{step}` must keep at least one item")]
    MinimumCardinalityViolation { step: String },

    /// A transition was requested for a step that is not the current one
    #[error("step `{requested}` submitted while `{current}` is current")]
    OutOfSequenceTransition { requested: String, current: String },

    /// The wizard already reached its terminal state
    #[error("the wizard has already been submitted")]
    AlreadySubmitted,

    /// No item with this identity exists in the current step
    #[error("no item `{0}` in the current step")]
    UnknownItem(ItemId),

    /// The step name is not part of the wizard plan
    #[error("unknown step `{0}`")]
    UnknownStep(String),

    /// A list command was sent to a single-record step or vice versa
    #[error("step `{step}` does not accept this kind of draft")]
    CardinalityMismatch { step: String },

    /// The current step has no designated pass-through field
    #[error("step `{step}` has no opaque field")]
    OpaqueFieldNotAllowed { step: String },

    /// The plan handed to the wizard is unusable
    #[error("invalid wizard plan: {0}")]
    InvalidPlan(String),
}

impl WizardError {
    /// Field errors attached to a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            WizardError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Sequencing errors signal stale or duplicate commands rather than bad input
    pub fn is_stale_command(&self) -> bool {
        matches!(
            self,
            WizardError::OutOfSequenceTransition { .. } | WizardError::AlreadySubmitted
        )
    }
}
