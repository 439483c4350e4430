//! Step definitions of the onboarding wizard

use super::payload::{FamilyStatus, FamilyType, LicenseCategory, MilitaryType};
use crate::error::WizardError;
use crate::state::forms::{record, Cardinality, FieldRule, FieldValue, Schema, StepDefinition};
use crate::state::WizardSession;

pub const EMPLOYEE_STEP: &str = "employee";
pub const LICENSES_STEP: &str = "licenses";
pub const FAMILY_STEP: &str = "family";

/// Pass-through field of the employee step
pub const PHOTO_FIELD: &str = "photoUrl";

const REQUIRED: &str = "Обов'язкове поле";
const FIRST_NAME_SHORT: &str = "Ім'я занадто коротке";
const LAST_NAME_SHORT: &str = "Прізвище занадто коротке";
const PHONE_DIGITS: &str = "Будь ласка введіть правильний номер";
const PHONE_LENGTH: &str = "Номер телефону має 10 цифр";
const DATE_INVALID: &str = "Невірна дата";
const DATE_IN_FUTURE: &str = "Дата не може бути в майбутньому";
const CHOOSE_OPTION: &str = "Виберіть значення зі списку";

/// Identity fields shared by the employee and each family member
fn person_rules() -> Result<Vec<FieldRule>, WizardError> {
    Ok(vec![
        FieldRule::string("firstName", "Ім'я")
            .required(FIRST_NAME_SHORT)
            .min_len(2, FIRST_NAME_SHORT),
        FieldRule::string("lastName", "Прізвище")
            .required(LAST_NAME_SHORT)
            .min_len(2, LAST_NAME_SHORT),
        FieldRule::date("birthday", "Дата народження")
            .required(REQUIRED)
            .invalid(DATE_INVALID)
            .not_in_future(DATE_IN_FUTURE),
        FieldRule::string("birthdayLocation", "Місце народження")
            .required(REQUIRED)
            .min_len(2, REQUIRED),
        FieldRule::string("phone", "Номер телефону")
            .required(PHONE_DIGITS)
            .exact_len(10, PHONE_LENGTH)
            .pattern(r"^\d+$", PHONE_DIGITS)?,
    ])
}

fn yes_no(name: &str, label: &str) -> FieldRule {
    FieldRule::boolean(name, label).required(REQUIRED)
}

pub fn employee_step() -> Result<StepDefinition, WizardError> {
    let mut rules = person_rules()?;
    rules.extend([
        FieldRule::string("nationality", "Національність")
            .required(REQUIRED)
            .min_len(2, REQUIRED),
        FieldRule::string("taxNumber", "Ідентифікаційний код")
            .required(REQUIRED)
            .exact_len(10, "Ідентифікаційний код має 10 цифр"),
        yes_no("hasCrime", "Чи є судимість?"),
        yes_no("hasBankCredits", "Чи є банківські кредити?"),
        FieldRule::opaque(PHOTO_FIELD, "Фото").required("Обов'язково завантажте фото"),
    ]);

    StepDefinition::new(
        EMPLOYEE_STEP,
        "Дані працівника",
        Schema::new(rules)?,
        Cardinality::Single,
        || {
            record([
                ("hasCrime", FieldValue::Bool(false)),
                ("hasBankCredits", FieldValue::Bool(false)),
            ])
        },
    )
    .with_opaque_field(PHOTO_FIELD)
}

pub fn licenses_step() -> Result<StepDefinition, WizardError> {
    let rules = vec![
        FieldRule::string("number", "Номер посвідчення")
            .required("Номер занадто короткий")
            .min_len(5, "Номер занадто короткий"),
        FieldRule::string_array(
            "categories",
            "Категорії транспортних засобів",
            LicenseCategory::ALL.iter().map(|c| c.as_str()),
        )
        .required("Виберіть хоча б одну категорію")
        .invalid(CHOOSE_OPTION)
        .min_items(1, "Виберіть хоча б одну категорію"),
        yes_no("active", "Чи посвідчення активне?"),
        FieldRule::date("applyDate", "Дата видачі")
            .required(REQUIRED)
            .invalid(DATE_INVALID)
            .not_in_future(DATE_IN_FUTURE),
    ];

    Ok(StepDefinition::new(
        LICENSES_STEP,
        "Водійські посвідчення",
        Schema::new(rules)?,
        Cardinality::List,
        || {
            record([
                ("number", FieldValue::text("")),
                ("categories", FieldValue::List(Vec::new())),
                ("active", FieldValue::Bool(true)),
                ("applyDate", FieldValue::text("")),
            ])
        },
    ))
}

pub fn family_step() -> Result<StepDefinition, WizardError> {
    let mut rules = person_rules()?;
    rules.extend([
        FieldRule::string("additionalInfo", "Додаткова інформація"),
        yes_no("hasCrime", "Чи є судимість?"),
        yes_no("hasBankCredits", "Чи є банківські кредити?"),
        yes_no("isMilitary", "Чи є військовослужбовцем?"),
        FieldRule::string_array(
            "militaryType",
            "Тип військ",
            MilitaryType::ALL.iter().map(|m| m.as_str()),
        )
        .invalid(CHOOSE_OPTION),
        FieldRule::one_of(
            "familyType",
            "Ступінь спорідненості",
            FamilyType::ALL.iter().map(|t| t.as_str()),
        )
        .required(REQUIRED)
        .invalid(CHOOSE_OPTION),
        FieldRule::one_of(
            "familyStatus",
            "Статус",
            FamilyStatus::ALL.iter().map(|s| s.as_str()),
        )
        .required(REQUIRED)
        .invalid(CHOOSE_OPTION),
    ]);

    Ok(StepDefinition::new(
        FAMILY_STEP,
        "Дані про сім'ю",
        Schema::new(rules)?,
        Cardinality::List,
        || {
            record([
                ("firstName", FieldValue::text("")),
                ("lastName", FieldValue::text("")),
                ("birthday", FieldValue::text("")),
                ("birthdayLocation", FieldValue::text("")),
                ("phone", FieldValue::text("")),
                ("additionalInfo", FieldValue::text("")),
                ("hasCrime", FieldValue::Bool(false)),
                ("hasBankCredits", FieldValue::Bool(false)),
                ("isMilitary", FieldValue::Bool(false)),
                ("militaryType", FieldValue::List(Vec::new())),
                ("familyType", FieldValue::text(FamilyType::Mother.as_str())),
                ("familyStatus", FieldValue::text(FamilyStatus::Active.as_str())),
            ])
        },
    ))
}

/// Employee → licenses → family
pub fn onboarding_plan() -> Result<Vec<StepDefinition>, WizardError> {
    Ok(vec![employee_step()?, licenses_step()?, family_step()?])
}

pub fn onboarding_session() -> Result<WizardSession, WizardError> {
    WizardSession::new(onboarding_plan()?)
}
