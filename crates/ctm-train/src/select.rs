//! Train every candidate family on one split and keep the best.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use ctm_features::{FeatureError, FeatureVector, Fitted, TfidfVectorizer};
use ctm_model::Label;

use crate::artifact::{ModelArtifact, TrainingMetadata};
use crate::classifier::{Classifier, TrainedModel, TrainingSet};
use crate::error::TrainError;
use crate::logistic::{LogisticConfig, LogisticRegression};
use crate::metrics::Metrics;
use crate::naive_bayes::MultinomialNaiveBayes;
use crate::split::stratified_split;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub seed: u64,
    /// Share of each class held out for evaluation.
    pub test_fraction: f64,
    pub logistic: LogisticConfig,
    pub naive_bayes_alpha: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            logistic: LogisticConfig::default(),
            naive_bayes_alpha: 1.0,
        }
    }
}

impl TrainConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }
}

/// Held-out metrics of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub model_name: String,
    pub metrics: Metrics,
}

/// Fit all candidates on a stratified split and bundle the winner.
///
/// The winner has the highest held-out F1; ties go to higher precision,
/// then to the alphabetically first name.
pub fn train_and_select(
    vectorizer: &TfidfVectorizer<Fitted>,
    features: &[FeatureVector],
    labels: &[Label],
    config: &TrainConfig,
) -> Result<ModelArtifact, TrainError> {
    if features.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    if features.is_empty() {
        return Err(TrainError::InsufficientData {
            message: "no samples".to_string(),
        });
    }
    let dimension = vectorizer.dimension();
    for vector in features {
        if vector.fingerprint() != vectorizer.fingerprint() {
            return Err(FeatureError::FingerprintMismatch {
                expected: vectorizer.fingerprint().to_string(),
                actual: vector.fingerprint().to_string(),
            }
            .into());
        }
        if vector.dimension() != dimension {
            return Err(TrainError::DimensionMismatch {
                expected: dimension,
                actual: vector.dimension(),
            });
        }
    }

    let split = stratified_split(labels, config.test_fraction, config.seed)?;
    let train_features: Vec<&FeatureVector> = split.train.iter().map(|&i| &features[i]).collect();
    let train_labels: Vec<Label> = split.train.iter().map(|&i| labels[i]).collect();
    let test_labels: Vec<Label> = split.test.iter().map(|&i| labels[i]).collect();
    let training = TrainingSet {
        features: &train_features,
        labels: &train_labels,
    };

    let mut candidates = vec![
        TrainedModel::LogisticRegression(LogisticRegression::new(dimension, config.logistic)),
        TrainedModel::NaiveBayes(MultinomialNaiveBayes::new(
            dimension,
            config.naive_bayes_alpha,
        )),
    ];
    let mut reports = Vec::with_capacity(candidates.len());
    for model in &mut candidates {
        model.fit(training)?;
        let predicted = split
            .test
            .iter()
            .map(|&i| model.predict(&features[i]))
            .collect::<Result<Vec<_>, _>>()?;
        let metrics = Metrics::compute(&test_labels, &predicted);
        info!(
            model = model.name(),
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            "evaluated candidate"
        );
        reports.push(CandidateReport {
            model_name: model.name().to_string(),
            metrics,
        });
    }

    let best = select_best(&reports).ok_or_else(|| TrainError::InsufficientData {
        message: "no candidate models".to_string(),
    })?;
    let chosen = candidates.swap_remove(best);
    info!(model = chosen.name(), f1 = reports[best].metrics.f1, "selected model");

    let eligible = labels.iter().filter(|l| l.is_eligible()).count();
    let metadata = TrainingMetadata {
        trained_at: Utc::now().to_rfc3339(),
        seed: config.seed,
        samples: labels.len(),
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        eligible_ratio: eligible as f64 / labels.len() as f64,
        config: *config,
    };
    Ok(ModelArtifact::from_parts(
        vectorizer.clone(),
        chosen,
        reports,
        best,
        metadata,
    ))
}

/// Index of the winning report.
pub fn select_best(reports: &[CandidateReport]) -> Option<usize> {
    reports
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.metrics
                .f1
                .total_cmp(&b.metrics.f1)
                .then(a.metrics.precision.total_cmp(&b.metrics.precision))
                .then_with(|| b.model_name.cmp(&a.model_name))
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ConfusionMatrix;

    fn report(name: &str, f1: f64, precision: f64) -> CandidateReport {
        CandidateReport {
            model_name: name.to_string(),
            metrics: Metrics {
                accuracy: 0.0,
                precision,
                recall: 0.0,
                f1,
                confusion: ConfusionMatrix::default(),
            },
        }
    }

    #[test]
    fn highest_f1_wins() {
        let reports = [report("b", 0.7, 0.1), report("a", 0.9, 0.1)];
        assert_eq!(select_best(&reports), Some(1));
    }

    #[test]
    fn precision_breaks_f1_ties() {
        let reports = [report("a", 0.8, 0.6), report("b", 0.8, 0.9)];
        assert_eq!(select_best(&reports), Some(1));
    }

    #[test]
    fn name_breaks_full_ties() {
        let reports = [report("naive_bayes", 0.8, 0.8), report("logistic_regression", 0.8, 0.8)];
        assert_eq!(select_best(&reports), Some(1));
        let reversed = [report("logistic_regression", 0.8, 0.8), report("naive_bayes", 0.8, 0.8)];
        assert_eq!(select_best(&reversed), Some(0));
    }
}
