//! Feature extraction errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Transform was requested before the vectorizer was fitted.
    #[error("vectorizer must be fitted before transform")]
    NotFitted,

    /// Fit was requested on a vectorizer that already holds a vocabulary.
    #[error("vectorizer is already fitted")]
    AlreadyFitted,

    #[error("cannot fit a vectorizer on an empty corpus")]
    EmptyCorpus,

    /// Every candidate term was filtered out.
    #[error("corpus produced an empty vocabulary")]
    EmptyVocabulary,

    #[error("invalid vectorizer config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// Restored vectorizer state is internally inconsistent.
    #[error("invalid vectorizer state: {message}")]
    InvalidState { message: String },

    /// Vectors come from different fitted vocabularies.
    #[error("feature fingerprint mismatch: expected {expected}, found {actual}")]
    FingerprintMismatch { expected: String, actual: String },

    #[error("feature dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FeatureError>;
