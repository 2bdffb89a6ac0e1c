//! L2-regularized logistic regression by full-batch gradient descent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ctm_features::FeatureVector;

use crate::classifier::{Classifier, TrainingSet, check_dimension, sigmoid};
use crate::error::TrainError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub l2: f64,
    pub max_iter: usize,
    /// Stop once the largest gradient component falls below this.
    pub tolerance: f64,
    /// Weight each class inversely to its frequency.
    pub balanced_class_weights: bool,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            l2: 1e-4,
            max_iter: 1000,
            tolerance: 1e-6,
            balanced_class_weights: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub config: LogisticConfig,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Gradient steps taken during the last fit.
    pub iterations: usize,
}

impl LogisticRegression {
    pub const NAME: &'static str = "logistic_regression";

    /// Zero-initialized model over `dimension` features.
    pub fn new(dimension: usize, config: LogisticConfig) -> Self {
        Self {
            config,
            weights: vec![0.0; dimension],
            bias: 0.0,
            iterations: 0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }

    fn logit(&self, features: &FeatureVector) -> f64 {
        self.bias
            + features
                .entries()
                .iter()
                .map(|(i, x)| self.weights[*i] * x)
                .sum::<f64>()
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn dimension(&self) -> usize {
        self.weights.len()
    }

    fn fit(&mut self, data: TrainingSet<'_>) -> Result<(), TrainError> {
        let (eligible, not_eligible) = data.class_counts();
        if eligible == 0 || not_eligible == 0 {
            return Err(TrainError::InsufficientData {
                message: format!(
                    "logistic regression needs both classes ({eligible} eligible, {not_eligible} not eligible)"
                ),
            });
        }
        for features in data.features {
            check_dimension(self.dimension(), features)?;
        }

        let n = data.len() as f64;
        let class_weight = |eligible_class: bool| {
            if !self.config.balanced_class_weights {
                1.0
            } else if eligible_class {
                n / (2.0 * eligible as f64)
            } else {
                n / (2.0 * not_eligible as f64)
            }
        };
        let sample_weights: Vec<f64> = data
            .labels
            .iter()
            .map(|label| class_weight(label.is_eligible()))
            .collect();

        self.weights.iter_mut().for_each(|w| *w = 0.0);
        self.bias = 0.0;
        self.iterations = 0;
        let mut gradient = vec![0.0; self.dimension()];
        for _ in 0..self.config.max_iter {
            gradient.iter_mut().for_each(|g| *g = 0.0);
            let mut bias_gradient = 0.0;
            for ((features, label), weight) in
                data.features.iter().zip(data.labels).zip(&sample_weights)
            {
                let target = f64::from(label.as_u8());
                let error = weight * (sigmoid(self.logit(features)) - target);
                for (i, x) in features.entries() {
                    gradient[*i] += error * x;
                }
                bias_gradient += error;
            }

            let mut largest = (bias_gradient / n).abs();
            for (g, w) in gradient.iter_mut().zip(&self.weights) {
                *g = *g / n + self.config.l2 * w;
                largest = largest.max(g.abs());
            }
            for (w, g) in self.weights.iter_mut().zip(&gradient) {
                *w -= self.config.learning_rate * g;
            }
            self.bias -= self.config.learning_rate * bias_gradient / n;
            self.iterations += 1;
            if largest < self.config.tolerance {
                break;
            }
        }
        debug!(iterations = self.iterations, "logistic regression converged");
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, TrainError> {
        check_dimension(self.dimension(), features)?;
        Ok(sigmoid(self.logit(features)))
    }
}
