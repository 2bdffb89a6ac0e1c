//! Labeled patient–trial pairs.
//!
//! A [`Pair`] can only be produced by running the rule evaluator, either
//! directly ([`Pair::derive`]) or by re-verifying a stored record
//! ([`Pair::from_record`]). Its label therefore always equals the
//! evaluator's output for the referenced patient and trial.

use serde::Serialize;
use tracing::debug;

use ctm_model::records::required;
use ctm_model::{
    Label, Labeled, PairRecord, Patient, PatientId, Trial, TrialId, ValidationError, pair_id,
};

use crate::evaluate::evaluate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pair_id: String,
    patient_id: PatientId,
    trial_id: TrialId,
    label: Label,
    reason: String,
}

impl Pair {
    /// Label a patient–trial combination with the rule evaluator.
    pub fn derive(patient: &Patient, trial: &Trial) -> Self {
        let evaluation = evaluate(patient, trial);
        Self {
            pair_id: pair_id(patient.id(), trial.id()),
            patient_id: patient.id().clone(),
            trial_id: trial.id().clone(),
            label: evaluation.label,
            reason: evaluation.reason(),
        }
    }

    /// Accept a stored pair only if its key and label agree with the rules.
    ///
    /// The stored reason is replaced by the canonical explanation.
    pub fn from_record(
        record: PairRecord,
        patient: &Patient,
        trial: &Trial,
    ) -> Result<Self, ValidationError> {
        const RECORD: &str = "pair";
        let patient_id = required(record.patient_id, RECORD, "patient_id")?;
        let trial_id = required(record.trial_id, RECORD, "trial_id")?;
        let stored = required(record.label, RECORD, "label")?;
        if patient_id.trim() != patient.id().as_str() {
            return Err(ValidationError::InvalidField {
                record: RECORD,
                field: "patient_id",
                message: format!("expected {}, got {patient_id}", patient.id()),
            });
        }
        if trial_id.trim() != trial.id().as_str() {
            return Err(ValidationError::InvalidField {
                record: RECORD,
                field: "trial_id",
                message: format!("expected {}, got {trial_id}", trial.id()),
            });
        }

        let derived = Self::derive(patient, trial);
        if let Some(stored_id) = record.pair_id
            && stored_id != derived.pair_id
        {
            return Err(ValidationError::PairKey {
                pair_id: stored_id,
                expected: derived.pair_id,
            });
        }
        if stored != derived.label {
            return Err(ValidationError::LabelMismatch {
                pair_id: derived.pair_id,
                stored: stored.as_u8(),
                derived: derived.label.as_u8(),
            });
        }
        if record.reason.as_deref() != Some(derived.reason.as_str()) {
            debug!(pair_id = %derived.pair_id, "stored reason replaced by canonical explanation");
        }
        Ok(derived)
    }

    pub fn pair_id(&self) -> &str {
        &self.pair_id
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn trial_id(&self) -> &TrialId {
        &self.trial_id
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn to_record(&self) -> PairRecord {
        PairRecord {
            pair_id: Some(self.pair_id.clone()),
            patient_id: Some(self.patient_id.to_string()),
            trial_id: Some(self.trial_id.to_string()),
            label: Some(self.label),
            reason: Some(self.reason.clone()),
        }
    }
}

impl Labeled for Pair {
    fn label(&self) -> Label {
        self.label
    }
}

/// Label every patient against every trial, patient-major.
pub fn label_all(patients: &[Patient], trials: &[Trial]) -> Vec<Pair> {
    patients
        .iter()
        .flat_map(|patient| trials.iter().map(move |trial| Pair::derive(patient, trial)))
        .collect()
}

/// Counts over a labeled set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelSummary {
    pub pairs_created: usize,
    pub eligible_pairs: usize,
    pub eligible_rate: f64,
}

impl LabelSummary {
    pub fn from_pairs<T: Labeled>(pairs: &[T]) -> Self {
        let eligible = pairs
            .iter()
            .filter(|pair| pair.label().is_eligible())
            .count();
        let rate = if pairs.is_empty() {
            0.0
        } else {
            eligible as f64 / pairs.len() as f64
        };
        Self {
            pairs_created: pairs.len(),
            eligible_pairs: eligible,
            eligible_rate: rate,
        }
    }
}
