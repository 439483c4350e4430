//! Wizard state module

pub mod forms;
mod session;
mod wizard;

pub use session::{SharedSession, StepSnapshot, WizardSession};
pub use wizard::{Aggregate, WizardPhase, WizardState};
