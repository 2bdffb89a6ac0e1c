//! Training pipeline: samples, balance, vectorize, train.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use ctm_features::{TfidfConfig, TfidfVectorizer};
use ctm_model::{Label, Patient, Trial};
use ctm_rules::Pair;
use ctm_synth::{BalanceConfig, balance};
use ctm_train::{CandidateReport, ModelArtifact, TrainConfig, train_and_select};

use crate::error::PipelineError;
use crate::sample::{Sample, pair_tokens};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub balance: BalanceConfig,
    pub tfidf: TfidfConfig,
    pub train: TrainConfig,
}

impl PipelineOptions {
    /// Use one seed for every randomized stage.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.balance.seed = seed;
        self.train.seed = seed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Samples {
    pub samples: Vec<Sample>,
    /// Pairs whose patient or trial was not supplied.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub samples: usize,
    pub skipped: usize,
    pub balanced: usize,
    pub dropped: usize,
    pub eligible_ratio: f64,
    pub feature_dimension: usize,
    pub fingerprint: String,
    pub candidates: Vec<CandidateReport>,
    pub chosen_model: String,
}

/// Join labeled pairs with their patient and trial texts.
pub fn build_samples(patients: &[Patient], trials: &[Trial], pairs: &[Pair]) -> Samples {
    let patients_by_id: HashMap<&str, &Patient> =
        patients.iter().map(|p| (p.id().as_str(), p)).collect();
    let trials_by_id: HashMap<&str, &Trial> =
        trials.iter().map(|t| (t.id().as_str(), t)).collect();

    let mut samples = Vec::with_capacity(pairs.len());
    let mut skipped = 0;
    for pair in pairs {
        let patient = patients_by_id.get(pair.patient_id().as_str());
        let trial = trials_by_id.get(pair.trial_id().as_str());
        let (Some(patient), Some(trial)) = (patient, trial) else {
            warn!(pair_id = pair.pair_id(), "pair references unknown patient or trial");
            skipped += 1;
            continue;
        };
        samples.push(Sample {
            pair_id: pair.pair_id().to_string(),
            label: pair.label(),
            tokens: pair_tokens(patient, trial),
        });
    }
    Samples { samples, skipped }
}

/// Run every stage and return the trained artifact with a report.
pub fn run_training(
    patients: &[Patient],
    trials: &[Trial],
    pairs: &[Pair],
    options: &PipelineOptions,
) -> Result<(ModelArtifact, PipelineReport), PipelineError> {
    let Samples { samples, skipped } = info_span!("samples").in_scope(|| {
        let start = Instant::now();
        let built = build_samples(patients, trials, pairs);
        info!(
            samples = built.samples.len(),
            skipped = built.skipped,
            duration_ms = start.elapsed().as_millis(),
            "samples built"
        );
        built
    });
    if samples.is_empty() {
        return Err(PipelineError::NoSamples { skipped });
    }
    let sample_count = samples.len();

    let balanced = info_span!("balance").in_scope(|| -> Result<_, PipelineError> {
        let start = Instant::now();
        let balanced = balance(&samples, &options.balance)?;
        info!(
            kept = balanced.items.len(),
            dropped = balanced.dropped,
            ratio = balanced.ratio,
            duration_ms = start.elapsed().as_millis(),
            "balance complete"
        );
        Ok(balanced)
    })?;

    let (vectorizer, features) = info_span!("vectorize").in_scope(|| -> Result<_, PipelineError> {
        let start = Instant::now();
        let corpus: Vec<&[String]> = balanced
            .items
            .iter()
            .map(|sample| sample.tokens.as_slice())
            .collect();
        let fitted = TfidfVectorizer::new(options.tfidf).fit_transform(&corpus)?;
        info!(
            documents = corpus.len(),
            dimension = fitted.0.dimension(),
            duration_ms = start.elapsed().as_millis(),
            "vectorize complete"
        );
        Ok(fitted)
    })?;

    let artifact = info_span!("train").in_scope(|| -> Result<_, PipelineError> {
        let start = Instant::now();
        let labels: Vec<Label> = balanced.items.iter().map(|sample| sample.label).collect();
        let artifact = train_and_select(&vectorizer, &features, &labels, &options.train)?;
        info!(
            model = artifact.model_name(),
            duration_ms = start.elapsed().as_millis(),
            "train complete"
        );
        Ok(artifact)
    })?;

    let report = PipelineReport {
        samples: sample_count,
        skipped,
        balanced: balanced.items.len(),
        dropped: balanced.dropped,
        eligible_ratio: balanced.ratio,
        feature_dimension: artifact.feature_dimension(),
        fingerprint: artifact.fingerprint().to_string(),
        candidates: artifact.candidates().to_vec(),
        chosen_model: artifact.model_name().to_string(),
    };
    Ok((artifact, report))
}
