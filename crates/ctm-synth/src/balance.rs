//! Class balancing by seeded downsampling.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::info;

use ctm_model::Labeled;

use crate::error::BalanceError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Desired share of eligible items in the output.
    pub target_ratio: f64,
    /// Maximum allowed distance between achieved and target ratio.
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            target_ratio: 0.5,
            tolerance: 0.02,
            seed: 42,
        }
    }
}

impl BalanceConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_target_ratio(mut self, ratio: f64) -> Self {
        self.target_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balanced<T> {
    pub items: Vec<T>,
    pub eligible: usize,
    pub not_eligible: usize,
    pub dropped: usize,
    pub ratio: f64,
}

/// Downsample the over-represented class toward `target_ratio`.
///
/// Keeps the largest subset that meets the ratio; surviving items keep
/// their input order. Every kept item is one of the inputs, unchanged.
pub fn balance<T: Labeled + Clone>(
    items: &[T],
    config: &BalanceConfig,
) -> Result<Balanced<T>, BalanceError> {
    let target = config.target_ratio;
    if !(target > 0.0 && target < 1.0) {
        return Err(BalanceError::InvalidRatio { ratio: target });
    }
    if config.tolerance.is_nan() || config.tolerance < 0.0 {
        return Err(BalanceError::InvalidTolerance {
            tolerance: config.tolerance,
        });
    }

    let (eligible_idx, other_idx): (Vec<usize>, Vec<usize>) =
        (0..items.len()).partition(|&i| items[i].label().is_eligible());
    let (eligible, not_eligible) = (eligible_idx.len(), other_idx.len());
    if eligible == 0 || not_eligible == 0 {
        return Err(BalanceError::InsufficientData {
            eligible,
            not_eligible,
        });
    }

    let (keep_eligible, keep_other) = class_sizes(eligible, not_eligible, target);
    let achieved = keep_eligible as f64 / (keep_eligible + keep_other) as f64;
    if (achieved - target).abs() > config.tolerance {
        return Err(BalanceError::ToleranceExceeded {
            achieved,
            target,
            tolerance: config.tolerance,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut keep: Vec<usize> = pick(&mut rng, &eligible_idx, keep_eligible);
    keep.extend(pick(&mut rng, &other_idx, keep_other));
    keep.sort_unstable();

    let kept: Vec<T> = keep.into_iter().map(|i| items[i].clone()).collect();
    let dropped = items.len() - kept.len();
    info!(
        eligible = keep_eligible,
        not_eligible = keep_other,
        dropped,
        ratio = achieved,
        "balanced dataset"
    );
    Ok(Balanced {
        items: kept,
        eligible: keep_eligible,
        not_eligible: keep_other,
        dropped,
        ratio: achieved,
    })
}

/// Largest `(eligible, not_eligible)` counts at or near `target`.
fn class_sizes(eligible: usize, not_eligible: usize, target: f64) -> (usize, usize) {
    let wanted_other = (eligible as f64 * (1.0 - target) / target).round() as usize;
    if wanted_other <= not_eligible {
        (eligible, wanted_other.max(1))
    } else {
        let wanted_eligible = (not_eligible as f64 * target / (1.0 - target)).round() as usize;
        (wanted_eligible.clamp(1, eligible), not_eligible)
    }
}

fn pick(rng: &mut StdRng, pool: &[usize], amount: usize) -> Vec<usize> {
    if amount >= pool.len() {
        return pool.to_vec();
    }
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}
