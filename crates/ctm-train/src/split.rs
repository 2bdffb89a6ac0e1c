//! Seeded stratified train/test split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use ctm_model::Label;

use crate::error::TrainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Sample indices in ascending order.
    pub train: Vec<usize>,
    /// Sample indices in ascending order.
    pub test: Vec<usize>,
}

/// Split indices so each class keeps its proportion on both sides.
///
/// Every class contributes at least one sample to each side.
pub fn stratified_split(
    labels: &[Label],
    test_fraction: f64,
    seed: u64,
) -> Result<Split, TrainError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainError::InvalidConfig {
            field: "test_fraction",
            message: format!("{test_fraction} must be strictly between 0 and 1"),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = Split {
        train: Vec::with_capacity(labels.len()),
        test: Vec::new(),
    };
    for class in [Label::NotEligible, Label::Eligible] {
        let mut members: Vec<usize> = (0..labels.len())
            .filter(|&i| labels[i] == class)
            .collect();
        if members.len() < 2 {
            return Err(TrainError::InsufficientData {
                message: format!(
                    "class {} has {} sample(s); at least 2 are needed to split",
                    class.as_u8(),
                    members.len()
                ),
            });
        }
        members.shuffle(&mut rng);
        let held_out = ((members.len() as f64 * test_fraction).round() as usize)
            .clamp(1, members.len() - 1);
        split.test.extend_from_slice(&members[..held_out]);
        split.train.extend_from_slice(&members[held_out..]);
    }
    split.train.sort_unstable();
    split.test.sort_unstable();
    Ok(split)
}
