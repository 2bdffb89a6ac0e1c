//! JSON record shapes exchanged with the storage layer.
//!
//! Records keep every field optional so that a missing field is reported by
//! name through [`ValidationError::MissingField`] instead of a generic parse
//! failure. Conversion into [`Patient`] and [`Trial`] is the only way into
//! the pipeline.

use serde::{Deserialize, Serialize};

use crate::condition::{ConditionName, condition_set};
use crate::ids::{PatientId, TrialId};
use crate::patient::{Gender, Patient};
use crate::trial::{Criteria, Trial};
use crate::{Label, ValidationError};

/// Upper bound accepted for ages in records.
pub const MAX_RECORD_AGE: i64 = 130;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PatientMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated_conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<CriteriaRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    /// `[]` when the trial has no such conditions; absence is an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_conditions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Unwrap an optional record field or name it in a validation error.
pub fn required<T>(value: Option<T>, record: &'static str, field: &'static str) -> crate::Result<T> {
    value.ok_or(ValidationError::MissingField { record, field })
}

fn record_age(value: i64, record: &'static str, field: &'static str) -> crate::Result<u32> {
    if !(0..=MAX_RECORD_AGE).contains(&value) {
        return Err(ValidationError::InvalidField {
            record,
            field,
            message: format!("age {value} outside 0..={MAX_RECORD_AGE}"),
        });
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidField {
        record,
        field,
        message: format!("age {value} is not representable"),
    })
}

impl TryFrom<PatientRecord> for Patient {
    type Error = ValidationError;

    fn try_from(record: PatientRecord) -> Result<Self, Self::Error> {
        const RECORD: &str = "patient";
        let id = PatientId::new(required(record.patient_id, RECORD, "patient_id")?)?;
        let raw_text = required(record.raw_text, RECORD, "raw_text")?;
        let metadata = required(record.metadata, RECORD, "metadata")?;
        let age = record_age(
            required(metadata.age, RECORD, "metadata.age")?,
            RECORD,
            "metadata.age",
        )?;
        let gender: Gender = required(metadata.gender, RECORD, "metadata.gender")?.parse()?;
        let conditions = condition_set(required(metadata.conditions, RECORD, "metadata.conditions")?);
        let negated = condition_set(required(
            metadata.negated_conditions,
            RECORD,
            "metadata.negated_conditions",
        )?);

        let mut builder = Patient::builder(id, age, gender)
            .raw_text(raw_text)
            .conditions(conditions)
            .negated_conditions(negated);
        if let Some(source) = metadata.source {
            builder = builder.source(source);
        }
        Ok(builder.build())
    }
}

impl From<&Patient> for PatientRecord {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: Some(patient.id().to_string()),
            raw_text: Some(patient.raw_text().to_string()),
            metadata: Some(PatientMetadata {
                age: Some(i64::from(patient.age())),
                gender: Some(patient.gender().as_str().to_string()),
                conditions: Some(names(patient.conditions())),
                negated_conditions: Some(names(patient.negated_conditions())),
                source: patient.source().map(str::to_string),
            }),
        }
    }
}

impl TryFrom<TrialRecord> for Trial {
    type Error = ValidationError;

    fn try_from(record: TrialRecord) -> Result<Self, Self::Error> {
        const RECORD: &str = "trial";
        let id = TrialId::new(required(record.trial_id, RECORD, "trial_id")?)?;
        let text = required(record.eligibility_text, RECORD, "eligibility_text")?;
        let criteria = required(record.criteria, RECORD, "criteria")?;
        let min_age = record_age(
            required(criteria.min_age, RECORD, "criteria.min_age")?,
            RECORD,
            "criteria.min_age",
        )?;
        let max_age = record_age(
            required(criteria.max_age, RECORD, "criteria.max_age")?,
            RECORD,
            "criteria.max_age",
        )?;
        let required_conditions = required(
            criteria.required_conditions,
            RECORD,
            "criteria.required_conditions",
        )?;
        let excluded_conditions = required(
            criteria.excluded_conditions,
            RECORD,
            "criteria.excluded_conditions",
        )?;
        let criteria = Criteria::new(
            min_age,
            max_age,
            condition_set(required_conditions),
            condition_set(excluded_conditions),
        )?;
        let trial = Trial::new(id, text, criteria);
        Ok(match record.title {
            Some(title) => trial.with_title(title),
            None => trial,
        })
    }
}

impl From<&Trial> for TrialRecord {
    fn from(trial: &Trial) -> Self {
        let criteria = trial.criteria();
        Self {
            trial_id: Some(trial.id().to_string()),
            title: trial.title().map(str::to_string),
            eligibility_text: Some(trial.eligibility_text().to_string()),
            criteria: Some(CriteriaRecord {
                min_age: Some(i64::from(criteria.min_age())),
                max_age: Some(i64::from(criteria.max_age())),
                required_conditions: Some(names(criteria.required_conditions())),
                excluded_conditions: Some(names(criteria.excluded_conditions())),
            }),
        }
    }
}

fn names<'a>(conditions: impl IntoIterator<Item = &'a ConditionName>) -> Vec<String> {
    conditions.into_iter().map(ToString::to_string).collect()
}
