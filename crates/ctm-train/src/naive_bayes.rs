//! Multinomial naive Bayes over non-negative TF-IDF weights.

use serde::{Deserialize, Serialize};

use ctm_features::FeatureVector;

use crate::classifier::{Classifier, TrainingSet, check_dimension, sigmoid};
use crate::error::{ArtifactError, TrainError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// Laplace smoothing.
    pub alpha: f64,
    /// `[not eligible, eligible]`.
    pub class_log_prior: [f64; 2],
    /// Per-class log feature probabilities, indexed like `class_log_prior`.
    pub feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNaiveBayes {
    pub const NAME: &'static str = "naive_bayes";

    pub fn new(dimension: usize, alpha: f64) -> Self {
        let uniform = -(dimension.max(1) as f64).ln();
        Self {
            alpha,
            class_log_prior: [0.5f64.ln(); 2],
            feature_log_prob: [vec![uniform; dimension], vec![uniform; dimension]],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.alpha.is_finite()
            && self.class_log_prior.iter().all(|p| p.is_finite())
            && self
                .feature_log_prob
                .iter()
                .flatten()
                .all(|p| p.is_finite())
    }

    /// Both class rows span `dimension` features and smoothing is positive.
    pub fn validate(&self, dimension: usize) -> Result<(), ArtifactError> {
        if let Some(row) = self
            .feature_log_prob
            .iter()
            .find(|row| row.len() != dimension)
        {
            return Err(ArtifactError::Incompatible {
                context: "classifier dimension",
                expected: dimension.to_string(),
                actual: row.len().to_string(),
            });
        }
        if self.alpha.is_nan() || self.alpha <= 0.0 {
            return Err(ArtifactError::Incompatible {
                context: "classifier parameters",
                expected: "positive smoothing".to_string(),
                actual: self.alpha.to_string(),
            });
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, features: &FeatureVector, class: usize) -> f64 {
        self.class_log_prior[class]
            + features
                .entries()
                .iter()
                .map(|(i, x)| x * self.feature_log_prob[class][*i])
                .sum::<f64>()
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn dimension(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    fn fit(&mut self, data: TrainingSet<'_>) -> Result<(), TrainError> {
        if self.alpha.is_nan() || self.alpha <= 0.0 {
            return Err(TrainError::InvalidConfig {
                field: "naive_bayes_alpha",
                message: format!("{} must be positive", self.alpha),
            });
        }
        let (eligible, not_eligible) = data.class_counts();
        if eligible == 0 || not_eligible == 0 {
            return Err(TrainError::InsufficientData {
                message: format!(
                    "naive Bayes needs both classes ({eligible} eligible, {not_eligible} not eligible)"
                ),
            });
        }

        let dimension = self.dimension();
        let mut feature_totals = [vec![0.0; dimension], vec![0.0; dimension]];
        for (features, label) in data.features.iter().zip(data.labels) {
            check_dimension(dimension, features)?;
            let class = usize::from(label.as_u8());
            for (i, x) in features.entries() {
                feature_totals[class][*i] += x;
            }
        }

        let n = data.len() as f64;
        self.class_log_prior = [
            (not_eligible as f64 / n).ln(),
            (eligible as f64 / n).ln(),
        ];
        for (class, totals) in feature_totals.iter().enumerate() {
            let denominator = totals.iter().sum::<f64>() + self.alpha * dimension as f64;
            self.feature_log_prob[class] = totals
                .iter()
                .map(|count| ((count + self.alpha) / denominator).ln())
                .collect();
        }
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, TrainError> {
        check_dimension(self.dimension(), features)?;
        let eligible = self.joint_log_likelihood(features, 1);
        let not_eligible = self.joint_log_likelihood(features, 0);
        Ok(sigmoid(eligible - not_eligible))
    }
}
