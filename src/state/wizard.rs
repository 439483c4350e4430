//! Wizard state machine
//!
//! Sequences the steps of a plan and owns the cumulative aggregate. Moves
//! forward only: each accepted step advances by exactly one, the last one
//! moves to the terminal `Submitted` phase and freezes the aggregate.

use crate::error::WizardError;
use crate::state::forms::{StepData, StepDefinition};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Where the wizard currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "lowercase")]
pub enum WizardPhase {
    /// 1-indexed step position
    Step(usize),
    Submitted,
}

/// Validated data per step name, in plan order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Aggregate(IndexMap<String, StepData>);

impl Aggregate {
    pub fn get(&self, step: &str) -> Option<&StepData> {
        self.0.get(step)
    }

    pub fn contains(&self, step: &str) -> bool {
        self.0.contains_key(step)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct WizardState {
    plan: Vec<Arc<StepDefinition>>,
    current_step: usize,
    submitted: bool,
    aggregate: Aggregate,
}

impl WizardState {
    /// Start a session at step 1 with an empty aggregate
    pub fn new(plan: Vec<Arc<StepDefinition>>) -> Result<Self, WizardError> {
        if plan.is_empty() {
            return Err(WizardError::InvalidPlan("the plan has no steps".to_string()));
        }
        for (i, step) in plan.iter().enumerate() {
            if plan[..i].iter().any(|s| s.name == step.name) {
                return Err(WizardError::InvalidPlan(format!(
                    "step `{}` appears twice",
                    step.name
                )));
            }
        }
        Ok(Self {
            plan,
            current_step: 1,
            submitted: false,
            aggregate: Aggregate::default(),
        })
    }

    /// 1-indexed position of the current step; stays on the last step once submitted
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.plan.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn phase(&self) -> WizardPhase {
        if self.submitted {
            WizardPhase::Submitted
        } else {
            WizardPhase::Step(self.current_step)
        }
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn plan(&self) -> &[Arc<StepDefinition>] {
        &self.plan
    }

    /// Definition of the active step, `None` once submitted
    pub fn current_definition(&self) -> Option<&Arc<StepDefinition>> {
        if self.submitted {
            return None;
        }
        self.plan.get(self.current_step - 1)
    }

    /// The active step's definition if it is `step_name`; otherwise the
    /// sequencing error a command for `step_name` deserves
    pub fn expect_current(&self, step_name: &str) -> Result<&Arc<StepDefinition>, WizardError> {
        if self.submitted {
            tracing::warn!(step = step_name, "command after submission ignored");
            return Err(WizardError::AlreadySubmitted);
        }

        let current = &self.plan[self.current_step - 1];
        if current.name == step_name {
            return Ok(current);
        }
        if !self.plan.iter().any(|s| s.name == step_name) {
            return Err(WizardError::UnknownStep(step_name.to_string()));
        }
        tracing::warn!(
            requested = step_name,
            current = %current.name,
            "out of sequence transition rejected"
        );
        Err(WizardError::OutOfSequenceTransition {
            requested: step_name.to_string(),
            current: current.name.clone(),
        })
    }

    /// Merge accepted data for the current step and move on
    pub fn advance(&mut self, step_name: &str, data: StepData) -> Result<WizardPhase, WizardError> {
        let current = self.expect_current(step_name)?;
        if data.cardinality() != current.cardinality {
            return Err(WizardError::CardinalityMismatch {
                step: step_name.to_string(),
            });
        }

        self.aggregate.0.insert(step_name.to_string(), data);

        if self.current_step == self.plan.len() {
            self.submitted = true;
            tracing::info!(steps = self.aggregate.len(), "wizard submitted");
        } else {
            self.current_step += 1;
            tracing::info!(
                step = step_name,
                next = self.current_step,
                "step accepted"
            );
        }
        Ok(self.phase())
    }
}
