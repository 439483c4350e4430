//! Onboarding wizard: employee, driver licenses and family members
//!
//! The three steps are plain [`StepDefinition`]s composed from generic field
//! rules; nothing here is known to the validator or the state machine.

mod catalogue;
mod payload;

pub use catalogue::{
    employee_step, family_step, licenses_step, onboarding_plan, onboarding_session, EMPLOYEE_STEP,
    FAMILY_STEP, LICENSES_STEP, PHOTO_FIELD,
};
pub use payload::{
    Employee, FamilyMember, FamilyStatus, FamilyType, License, LicenseCategory, MilitaryType,
    OnboardingPayload,
};
