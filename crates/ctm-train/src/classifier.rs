//! The classifier seam and the persisted model families.

use serde::{Deserialize, Serialize};

use ctm_features::FeatureVector;
use ctm_model::Label;

use crate::error::{ArtifactError, TrainError};
use crate::logistic::LogisticRegression;
use crate::naive_bayes::MultinomialNaiveBayes;

/// Probability at or above which a prediction is `Eligible`.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Borrowed feature vectors paired with their labels.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSet<'a> {
    pub features: &'a [&'a FeatureVector],
    pub labels: &'a [Label],
}

impl TrainingSet<'_> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn class_counts(&self) -> (usize, usize) {
        let eligible = self.labels.iter().filter(|l| l.is_eligible()).count();
        (eligible, self.labels.len() - eligible)
    }
}

pub trait Classifier {
    fn name(&self) -> &'static str;

    /// Number of input features the classifier expects.
    fn dimension(&self) -> usize;

    fn fit(&mut self, data: TrainingSet<'_>) -> Result<(), TrainError>;

    /// Probability that the sample is `Eligible`.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, TrainError>;

    fn predict(&self, features: &FeatureVector) -> Result<Label, TrainError> {
        Ok(Label::from_bool(
            self.predict_proba(features)? >= DECISION_THRESHOLD,
        ))
    }
}

pub(crate) fn check_dimension(expected: usize, features: &FeatureVector) -> Result<(), TrainError> {
    if features.dimension() == expected {
        Ok(())
    } else {
        Err(TrainError::DimensionMismatch {
            expected,
            actual: features.dimension(),
        })
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// A fitted model of one of the supported families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    NaiveBayes(MultinomialNaiveBayes),
}

impl TrainedModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(model) => model,
            TrainedModel::NaiveBayes(model) => model,
        }
    }

    /// Parameter shapes agree with a `dimension`-wide vectorizer.
    pub fn validate(&self, dimension: usize) -> Result<(), ArtifactError> {
        match self {
            TrainedModel::LogisticRegression(model) if model.weights.len() != dimension => {
                Err(ArtifactError::Incompatible {
                    context: "classifier dimension",
                    expected: dimension.to_string(),
                    actual: model.weights.len().to_string(),
                })
            }
            TrainedModel::LogisticRegression(_) => Ok(()),
            TrainedModel::NaiveBayes(model) => model.validate(dimension),
        }
    }

    /// Every learned parameter is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            TrainedModel::LogisticRegression(model) => model.is_finite(),
            TrainedModel::NaiveBayes(model) => model.is_finite(),
        }
    }
}

impl Classifier for TrainedModel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn dimension(&self) -> usize {
        self.inner().dimension()
    }

    fn fit(&mut self, data: TrainingSet<'_>) -> Result<(), TrainError> {
        match self {
            TrainedModel::LogisticRegression(model) => model.fit(data),
            TrainedModel::NaiveBayes(model) => model.fit(data),
        }
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, TrainError> {
        self.inner().predict_proba(features)
    }
}
