//! Eligibility decisions combining the rule label with the model's view.
//!
//! The rule label is authoritative. The model prediction is reported next
//! to it and disagreement is surfaced through `agreement`, never hidden.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use ctm_features::cosine_similarity;
use ctm_model::{Label, Patient, Trial};
use ctm_rules::{RuleLine, evaluate};
use ctm_text::clean_tokens;
use ctm_train::{ArtifactError, ArtifactHandle, Classifier, ModelArtifact};

use crate::error::DecisionError;
use crate::sample::pair_tokens;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    pub patient_id: String,
    pub trial_id: String,
    pub rule_label: Label,
    pub ml_label: Label,
    /// Model probability of `Eligible`.
    pub probability: f64,
    pub agreement: bool,
    pub explanation: String,
    pub rule_lines: Vec<RuleLine>,
    pub matched_terms: Vec<String>,
    pub violated_terms: Vec<String>,
    /// Cosine similarity of patient text and trial text vectors.
    pub similarity: f64,
    pub model_name: String,
}

impl DecisionResult {
    /// Probability the model assigns to its own label.
    pub fn confidence(&self) -> f64 {
        if self.ml_label.is_eligible() {
            self.probability
        } else {
            1.0 - self.probability
        }
    }
}

/// Sort by descending model probability, keeping input order on ties.
pub fn rank_by_probability(results: &mut [DecisionResult]) {
    results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    artifact: Arc<ModelArtifact>,
}

impl DecisionEngine {
    /// Fails fast if the artifact cannot score its own vectors.
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self, DecisionError> {
        let dimension = artifact.feature_dimension();
        let classifier_dimension = artifact.classifier().dimension();
        if dimension != classifier_dimension {
            return Err(ArtifactError::Incompatible {
                context: "classifier dimension",
                expected: dimension.to_string(),
                actual: classifier_dimension.to_string(),
            }
            .into());
        }
        Ok(Self { artifact })
    }

    /// Engine over whatever artifact the handle currently holds.
    pub fn from_handle(handle: &ArtifactHandle) -> Result<Self, DecisionError> {
        Self::new(handle.current())
    }

    pub fn artifact(&self) -> &Arc<ModelArtifact> {
        &self.artifact
    }

    pub fn decide(&self, patient: &Patient, trial: &Trial) -> Result<DecisionResult, DecisionError> {
        let evaluation = evaluate(patient, trial);

        let prediction = self.artifact.predict_tokens(&pair_tokens(patient, trial))?;

        let vectorizer = self.artifact.vectorizer();
        let patient_vector = vectorizer.transform(&clean_tokens(patient.raw_text()));
        let trial_vector = vectorizer.transform(&clean_tokens(trial.eligibility_text()));
        let similarity = cosine_similarity(&patient_vector, &trial_vector)?;

        let agreement = evaluation.label == prediction.label;
        if agreement {
            debug!(
                patient_id = %patient.id(),
                trial_id = %trial.id(),
                label = evaluation.label.as_u8(),
                probability = prediction.probability,
                "decision"
            );
        } else {
            warn!(
                patient_id = %patient.id(),
                trial_id = %trial.id(),
                rule_label = evaluation.label.as_u8(),
                ml_label = prediction.label.as_u8(),
                probability = prediction.probability,
                "model disagrees with eligibility rules"
            );
        }

        Ok(DecisionResult {
            patient_id: patient.id().to_string(),
            trial_id: trial.id().to_string(),
            rule_label: evaluation.label,
            ml_label: prediction.label,
            probability: prediction.probability,
            agreement,
            explanation: evaluation.reason(),
            rule_lines: evaluation.explanation.lines(),
            matched_terms: evaluation.matched_terms(),
            violated_terms: evaluation.violated_terms(),
            similarity,
            model_name: self.artifact.model_name().to_string(),
        })
    }

    /// Decide one patient against several trials, in the order given.
    pub fn decide_batch(
        &self,
        patient: &Patient,
        trials: &[Trial],
    ) -> Result<Vec<DecisionResult>, DecisionError> {
        trials
            .iter()
            .map(|trial| self.decide(patient, trial))
            .collect()
    }
}
