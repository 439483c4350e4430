//! Command/query facade driven by a presentation layer

use super::forms::{
    AddedItem, Cardinality, DraftView, FieldErrors, FieldValue, ItemId, Record, Schema,
    StepController, StepDefinition, StepInput, StepOutcome, StepStatus, Validator,
};
use super::wizard::{Aggregate, WizardPhase, WizardState};
use crate::error::WizardError;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Read-only snapshot of the current step for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub name: String,
    pub title: String,
    pub position: usize,
    pub total_steps: usize,
    pub cardinality: Cardinality,
    pub schema: Schema,
    pub status: StepStatus,
    pub draft: DraftView,
    pub errors: FieldErrors,
    pub opaque_field: Option<String>,
}

/// One wizard run: the state machine plus the controller of the active step
#[derive(Debug, Clone)]
pub struct WizardSession {
    wizard: WizardState,
    controller: Option<StepController>,
    validator: Validator,
}

impl WizardSession {
    pub fn new(plan: Vec<StepDefinition>) -> Result<Self, WizardError> {
        Self::with_validator(plan, Validator::default())
    }

    /// Create a session whose date checks use the given validator
    pub fn with_validator(plan: Vec<StepDefinition>, validator: Validator) -> Result<Self, WizardError> {
        let wizard = WizardState::new(plan.into_iter().map(Arc::new).collect())?;
        let controller = wizard.current_definition().cloned().map(StepController::new);
        Ok(Self {
            wizard,
            controller,
            validator,
        })
    }

    pub fn phase(&self) -> WizardPhase {
        self.wizard.phase()
    }

    pub fn current_position(&self) -> usize {
        self.wizard.current_step()
    }

    pub fn is_submitted(&self) -> bool {
        self.wizard.is_submitted()
    }

    pub fn aggregate(&self) -> &Aggregate {
        self.wizard.aggregate()
    }

    /// The collected payload, available once the wizard is submitted
    pub fn final_payload(&self) -> Option<&Aggregate> {
        self.is_submitted().then(|| self.wizard.aggregate())
    }

    /// Render query; `None` once submitted
    pub fn current_step(&self) -> Option<StepSnapshot> {
        let controller = self.controller.as_ref()?;
        let definition = controller.definition();
        Some(StepSnapshot {
            name: definition.name.clone(),
            title: definition.title.clone(),
            position: self.wizard.current_step(),
            total_steps: self.wizard.total_steps(),
            cardinality: definition.cardinality,
            schema: definition.schema.clone(),
            status: controller.status(),
            draft: controller.draft_view(),
            errors: controller.errors().clone(),
            opaque_field: definition.opaque_field.clone(),
        })
    }

    /// Identity of the list item at `index` in the current step
    pub fn item_id(&self, index: usize) -> Option<ItemId> {
        self.controller.as_ref()?.item_id(index)
    }

    /// Replace the current draft(s) with `input` and submit them
    pub fn submit_step(&mut self, input: StepInput) -> Result<WizardPhase, WizardError> {
        self.controller_mut()?.replace_draft(input)?;
        self.submit_current()
    }

    /// Submit on behalf of a named step. A late or duplicate submission for a
    /// step that is no longer current is refused without touching any state.
    pub fn submit_named(&mut self, step: &str, input: StepInput) -> Result<WizardPhase, WizardError> {
        self.wizard.expect_current(step)?;
        self.submit_step(input)
    }

    /// Submit the draft(s) held by the current controller
    pub fn submit_current(&mut self) -> Result<WizardPhase, WizardError> {
        let validator = self.validator;
        let controller = self.controller_mut()?;
        let name = controller.name().to_string();

        match controller.submit(&validator)? {
            StepOutcome::Rejected(errors) => {
                tracing::debug!(step = %name, fields = errors.len(), "step rejected");
                Err(WizardError::Validation { step: name, errors })
            }
            StepOutcome::Accepted(data) => {
                let phase = self.wizard.advance(&name, data)?;
                // the accepted draft is discarded with its controller
                self.controller = self
                    .wizard
                    .current_definition()
                    .cloned()
                    .map(StepController::new);
                Ok(phase)
            }
        }
    }

    pub fn update_draft(&mut self, patch: Record) -> Result<(), WizardError> {
        self.controller_mut()?.update_draft(patch)
    }

    pub fn add_item(&mut self) -> Result<AddedItem, WizardError> {
        let added = self.controller_mut()?.add_item()?;
        tracing::debug!(item = %added.id, len = added.len, "item added");
        Ok(added)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Record, WizardError> {
        let removed = self.controller_mut()?.remove_item(id)?;
        tracing::debug!(item = %id, "item removed");
        Ok(removed)
    }

    pub fn update_item(&mut self, id: ItemId, patch: Record) -> Result<(), WizardError> {
        self.controller_mut()?.update_item(id, patch)
    }

    /// Inject the designated pass-through value (e.g. a photo reference)
    pub fn set_opaque(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        self.controller_mut()?
            .set_opaque(FieldValue::Text(value.into()))
    }

    fn controller_mut(&mut self) -> Result<&mut StepController, WizardError> {
        self.controller.as_mut().ok_or(WizardError::AlreadySubmitted)
    }
}

/// A session that can be driven from several input sources. Each command
/// runs under one lock, so a transition or removal is never observed half done.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<WizardSession>>,
}

impl SharedSession {
    pub fn new(session: WizardSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run a closure against the session while holding the lock
    pub fn with<R>(&self, f: impl FnOnce(&mut WizardSession) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn current_step(&self) -> Option<StepSnapshot> {
        self.with(|s| s.current_step())
    }

    pub fn submit_step(&self, input: StepInput) -> Result<WizardPhase, WizardError> {
        self.with(|s| s.submit_step(input))
    }

    pub fn submit_named(&self, step: &str, input: StepInput) -> Result<WizardPhase, WizardError> {
        self.with(|s| s.submit_named(step, input))
    }

    pub fn submit_current(&self) -> Result<WizardPhase, WizardError> {
        self.with(|s| s.submit_current())
    }

    pub fn add_item(&self) -> Result<AddedItem, WizardError> {
        self.with(|s| s.add_item())
    }

    pub fn remove_item(&self, id: ItemId) -> Result<Record, WizardError> {
        self.with(|s| s.remove_item(id))
    }

    pub fn update_item(&self, id: ItemId, patch: Record) -> Result<(), WizardError> {
        self.with(|s| s.update_item(id, patch))
    }

    pub fn final_payload(&self) -> Option<Aggregate> {
        self.with(|s| s.final_payload().cloned())
    }
}
