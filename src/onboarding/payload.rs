//! Typed view of the submitted onboarding data

use crate::state::Aggregate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Driver license vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
}

impl LicenseCategory {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Service branch of a family member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilitaryType {
    Army,
    Police,
    BoardForces,
    MarineForces,
    AirForces,
}

impl MilitaryType {
    pub const ALL: [Self; 5] = [
        Self::Army,
        Self::Police,
        Self::BoardForces,
        Self::MarineForces,
        Self::AirForces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Army => "ARMY",
            Self::Police => "POLICE",
            Self::BoardForces => "BOARD_FORCES",
            Self::MarineForces => "MARINE_FORCES",
            Self::AirForces => "AIR_FORCES",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Army => "Армія",
            Self::Police => "Поліція",
            Self::BoardForces => "Прикордонні війська",
            Self::MarineForces => "Морські сили",
            Self::AirForces => "Повітряні сили",
        }
    }
}

/// Relation of a family member to the employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FamilyType {
    Mother,
    Father,
    Brother,
    Sister,
    Son,
    Daughter,
    Wife,
}

impl FamilyType {
    pub const ALL: [Self; 7] = [
        Self::Mother,
        Self::Father,
        Self::Brother,
        Self::Sister,
        Self::Son,
        Self::Daughter,
        Self::Wife,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mother => "Mother",
            Self::Father => "Father",
            Self::Brother => "Brother",
            Self::Sister => "Sister",
            Self::Son => "Son",
            Self::Daughter => "Daughter",
            Self::Wife => "Wife",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mother => "Мати",
            Self::Father => "Батько",
            Self::Brother => "Брат",
            Self::Sister => "Сестра",
            Self::Son => "Син",
            Self::Daughter => "Донька",
            Self::Wife => "Дружина",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyStatus {
    Active,
    Inactive,
    NotAlive,
}

impl FamilyStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::NotAlive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::NotAlive => "not-alive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Активний",
            Self::Inactive => "Неактивний",
            Self::NotAlive => "Неживий",
        }
    }
}

/// `DD-MM-YYYY` (de)serialization for dates in the payload
mod canonical_date {
    use crate::state::forms::{parse_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "canonical_date")]
    pub birthday: NaiveDate,
    pub birthday_location: String,
    pub phone: String,
    pub nationality: String,
    pub tax_number: String,
    pub has_crime: bool,
    pub has_bank_credits: bool,
    /// Opaque reference supplied by the presentation layer
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: Uuid,
    pub number: String,
    pub categories: Vec<LicenseCategory>,
    pub active: bool,
    #[serde(with = "canonical_date")]
    pub apply_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "canonical_date")]
    pub birthday: NaiveDate,
    pub birthday_location: String,
    pub phone: String,
    #[serde(default)]
    pub additional_info: String,
    pub has_crime: bool,
    pub has_bank_credits: bool,
    pub is_military: bool,
    #[serde(default)]
    pub military_type: Vec<MilitaryType>,
    pub family_type: FamilyType,
    pub family_status: FamilyStatus,
}

/// Final submission: `{ employee, licenses, family }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPayload {
    pub employee: Employee,
    pub licenses: Vec<License>,
    pub family: Vec<FamilyMember>,
}

impl OnboardingPayload {
    /// Read the typed payload out of a submitted aggregate
    pub fn from_aggregate(aggregate: &Aggregate) -> Result<Self, serde_json::Error> {
        serde_json::from_value(aggregate.to_json())
    }
}
