//! Decision and pipeline errors.

use thiserror::Error;

use ctm_features::FeatureError;
use ctm_synth::BalanceError;
use ctm_train::{ArtifactError, TrainError};

#[derive(Debug, Error)]
pub enum DecisionError {
    /// The artifact cannot serve predictions.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Prediction(#[from] TrainError),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no usable samples: {skipped} pair(s) referenced unknown patients or trials")]
    NoSamples { skipped: usize },

    #[error("balance stage failed: {0}")]
    Balance(#[from] BalanceError),

    #[error("vectorize stage failed: {0}")]
    Feature(#[from] FeatureError),

    #[error("train stage failed: {0}")]
    Train(#[from] TrainError),
}
