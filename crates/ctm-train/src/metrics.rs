//! Binary classification metrics on a held-out split.

use serde::{Deserialize, Serialize};

use ctm_model::Label;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[Label], predicted: &[Label]) -> Self {
        let mut matrix = Self::default();
        for (truth, guess) in actual.iter().zip(predicted) {
            match (truth.is_eligible(), guess.is_eligible()) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl Metrics {
    /// Metrics for the eligible class; undefined ratios are 0.
    pub fn compute(actual: &[Label], predicted: &[Label]) -> Self {
        let confusion = ConfusionMatrix::from_predictions(actual, predicted);
        let tp = confusion.true_positives as f64;
        let accuracy = ratio(tp + confusion.true_negatives as f64, confusion.total() as f64);
        let precision = ratio(tp, tp + confusion.false_positives as f64);
        let recall = ratio(tp, tp + confusion.false_negatives as f64);
        let f1 = ratio(2.0 * precision * recall, precision + recall);
        Self {
            accuracy,
            precision,
            recall,
            f1,
            confusion,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
