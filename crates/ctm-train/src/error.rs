//! Training and artifact errors.

use std::path::PathBuf;

use thiserror::Error;

use ctm_features::FeatureError;

#[derive(Debug, Error)]
pub enum TrainError {
    /// Not enough labeled samples to split and train.
    #[error("insufficient training data: {message}")]
    InsufficientData { message: String },

    #[error("{features} feature vectors but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    /// Feature vectors do not match the vectorizer they claim to come from.
    #[error("feature dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid training config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to {operation} artifact file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file was written but could not be moved into place.
    #[error("failed to replace artifact at {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is not valid JSON: {message}")]
    Parse { message: String },

    #[error("artifact is missing required field `{field}`")]
    MissingField { field: String },

    #[error("artifact format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Parts of the artifact disagree with each other.
    #[error("incompatible artifact {context}: expected {expected}, found {actual}")]
    Incompatible {
        context: &'static str,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

impl ArtifactError {
    /// Classify a JSON error, surfacing missing fields by name.
    pub(crate) fn from_json(error: &serde_json::Error) -> Self {
        let message = error.to_string();
        match missing_field_name(&message) {
            Some(field) => Self::MissingField {
                field: field.to_string(),
            },
            None => Self::Parse { message },
        }
    }
}

fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_extracted() {
        assert_eq!(
            missing_field_name("missing field `idf` at line 4 column 1"),
            Some("idf")
        );
        assert_eq!(missing_field_name("expected value at line 1"), None);
    }
}
