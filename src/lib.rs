//! Onboarding Wizard - multi-step form orchestration engine
//!
//! Sequences onboarding steps, validates each step's draft against a
//! declarative schema, manages repeatable records (driver licenses, family
//! members) and aggregates accepted steps into one submission payload.

pub mod attachment;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod script;
pub mod sink;
pub mod state;

pub use error::WizardError;
pub use state::{SharedSession, WizardPhase, WizardSession};
