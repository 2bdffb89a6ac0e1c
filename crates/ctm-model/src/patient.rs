use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;
use crate::condition::ConditionSet;
use crate::ids::PatientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Noun used when rendering narrative text.
    pub fn noun(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "person",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::InvalidField {
                record: "patient",
                field: "metadata.gender",
                message: format!("unknown gender '{other}'"),
            }),
        }
    }
}

/// A patient with raw narrative text and structured attributes.
///
/// Immutable once built; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    id: PatientId,
    raw_text: String,
    age: u32,
    gender: Gender,
    conditions: ConditionSet,
    negated_conditions: ConditionSet,
    source: Option<String>,
}

impl Patient {
    pub fn builder(id: PatientId, age: u32, gender: Gender) -> PatientBuilder {
        PatientBuilder {
            patient: Patient {
                id,
                raw_text: String::new(),
                age,
                gender,
                conditions: ConditionSet::new(),
                negated_conditions: ConditionSet::new(),
                source: None,
            },
        }
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn negated_conditions(&self) -> &ConditionSet {
        &self.negated_conditions
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Assembles a [`Patient`]; the patient is frozen by [`PatientBuilder::build`].
#[derive(Debug, Clone)]
pub struct PatientBuilder {
    patient: Patient,
}

impl PatientBuilder {
    #[must_use]
    pub fn raw_text(mut self, text: impl Into<String>) -> Self {
        self.patient.raw_text = text.into();
        self
    }

    #[must_use]
    pub fn conditions(mut self, conditions: ConditionSet) -> Self {
        self.patient.conditions = conditions;
        self
    }

    #[must_use]
    pub fn negated_conditions(mut self, conditions: ConditionSet) -> Self {
        self.patient.negated_conditions = conditions;
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.patient.source = Some(source.into());
        self
    }

    pub fn build(self) -> Patient {
        self.patient
    }
}
