//! Sparse, fingerprinted feature vectors.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// A sparse TF-IDF vector.
///
/// Entries are sorted by index with no duplicates. The fingerprint names
/// the fitted vocabulary that produced the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
    fingerprint: String,
}

impl FeatureVector {
    pub(crate) fn new(dimension: usize, entries: Vec<(usize, f64)>, fingerprint: String) -> Self {
        Self {
            dimension,
            entries,
            fingerprint,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, value)| *value == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, value)| value * value)
            .sum::<f64>()
            .sqrt()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map_or(0.0, |pos| self.entries[pos].1)
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (index, value) in &self.entries {
            if let Some(slot) = dense.get_mut(*index) {
                *slot = *value;
            }
        }
        dense
    }

    /// Dot product with a dense weight vector of the same dimension.
    pub fn dot_dense(&self, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.dimension {
            return Err(FeatureError::DimensionMismatch {
                expected: self.dimension,
                actual: weights.len(),
            });
        }
        Ok(self
            .entries
            .iter()
            .filter_map(|(index, value)| weights.get(*index).map(|w| w * value))
            .sum())
    }

    /// Dot product of two sparse vectors from the same vocabulary.
    pub fn dot(&self, other: &FeatureVector) -> Result<f64> {
        self.check_compatible(other)?;
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_index, a_value) = self.entries[i];
            let (b_index, b_value) = other.entries[j];
            match a_index.cmp(&b_index) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_value * b_value;
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(sum)
    }

    fn check_compatible(&self, other: &FeatureVector) -> Result<()> {
        if self.fingerprint != other.fingerprint {
            return Err(FeatureError::FingerprintMismatch {
                expected: self.fingerprint.clone(),
                actual: other.fingerprint.clone(),
            });
        }
        if self.dimension != other.dimension {
            return Err(FeatureError::DimensionMismatch {
                expected: self.dimension,
                actual: other.dimension,
            });
        }
        Ok(())
    }
}

/// Cosine similarity in `[0, 1]`; a zero vector yields 0.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    let dot = a.dot(b)?;
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / denominator).clamp(0.0, 1.0))
}
