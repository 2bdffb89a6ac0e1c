//! Classifier training, selection, and model artifacts.
//!
//! Two model families compete on a seeded stratified split; the winner is
//! bundled with the exact vectorizer it was trained against into a
//! [`ModelArtifact`].

#![deny(unsafe_code)]

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod logistic;
pub mod metrics;
pub mod naive_bayes;
pub mod select;
pub mod split;

pub use artifact::{
    ARTIFACT_FORMAT_VERSION, ArtifactFile, ArtifactHandle, ModelArtifact, Prediction,
    TrainingMetadata,
};
pub use classifier::{Classifier, DECISION_THRESHOLD, TrainedModel, TrainingSet};
pub use error::{ArtifactError, TrainError};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use metrics::{ConfusionMatrix, Metrics};
pub use naive_bayes::MultinomialNaiveBayes;
pub use select::{CandidateReport, TrainConfig, select_best, train_and_select};
pub use split::{Split, stratified_split};
