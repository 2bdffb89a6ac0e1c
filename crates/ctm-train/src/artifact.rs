//! Model artifacts: the frozen vectorizer plus the selected classifier.
//!
//! On disk an artifact is a single pretty-printed JSON document
//! ([`ArtifactFile`]). Loading rejects documents with missing fields,
//! an unknown format version, or parts whose dimensions or fingerprint
//! disagree. Saving writes a temp file and renames it into place.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use ctm_features::{FeatureError, FeatureVector, Fitted, TfidfVectorizer, VectorizerState};
use ctm_model::Label;

use crate::classifier::{Classifier, TrainedModel};
use crate::error::{ArtifactError, TrainError};
use crate::metrics::Metrics;
use crate::select::{CandidateReport, TrainConfig};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// RFC 3339 timestamp.
    pub trained_at: String,
    pub seed: u64,
    pub samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub eligible_ratio: f64,
    pub config: TrainConfig,
}

/// Serialized artifact layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub format_version: u32,
    pub model_name: String,
    pub feature_dimension: usize,
    pub vectorizer: VectorizerState,
    pub classifier: TrainedModel,
    pub candidates: Vec<CandidateReport>,
    pub training: TrainingMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of `Eligible`.
    pub probability: f64,
}

/// A validated, immutable model artifact.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    vectorizer: TfidfVectorizer<Fitted>,
    classifier: TrainedModel,
    candidates: Vec<CandidateReport>,
    /// Index of the chosen model's report in `candidates`.
    selected: usize,
    training: TrainingMetadata,
}

impl ModelArtifact {
    pub(crate) fn from_parts(
        vectorizer: TfidfVectorizer<Fitted>,
        classifier: TrainedModel,
        candidates: Vec<CandidateReport>,
        selected: usize,
        training: TrainingMetadata,
    ) -> Self {
        Self {
            vectorizer,
            classifier,
            candidates,
            selected,
            training,
        }
    }

    /// Validate a deserialized artifact.
    pub fn from_file(file: ArtifactFile) -> Result<Self, ArtifactError> {
        if file.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: file.format_version,
                supported: ARTIFACT_FORMAT_VERSION,
            });
        }
        let vocabulary = file.vectorizer.vocabulary.len();
        expect_equal("vectorizer idf length", vocabulary, file.vectorizer.idf.len())?;
        expect_equal("feature dimension", vocabulary, file.feature_dimension)?;
        file.classifier.validate(file.feature_dimension)?;
        if file.classifier.name() != file.model_name {
            return Err(ArtifactError::Incompatible {
                context: "model name",
                expected: file.classifier.name().to_string(),
                actual: file.model_name,
            });
        }
        let Some(selected) = file
            .candidates
            .iter()
            .position(|report| report.model_name == file.model_name)
        else {
            let names: Vec<&str> = file
                .candidates
                .iter()
                .map(|report| report.model_name.as_str())
                .collect();
            return Err(ArtifactError::Incompatible {
                context: "candidate metrics",
                expected: file.model_name,
                actual: if names.is_empty() {
                    "no candidates".to_string()
                } else {
                    names.join(", ")
                },
            });
        };
        if !file.classifier.is_finite() {
            return Err(ArtifactError::Incompatible {
                context: "classifier parameters",
                expected: "finite values".to_string(),
                actual: "non-finite values".to_string(),
            });
        }
        let vectorizer = TfidfVectorizer::from_state(file.vectorizer).map_err(|err| match err {
            FeatureError::FingerprintMismatch { expected, actual } => {
                ArtifactError::Incompatible {
                    context: "vectorizer fingerprint",
                    expected,
                    actual,
                }
            }
            other => ArtifactError::Feature(other),
        })?;
        Ok(Self::from_parts(
            vectorizer,
            file.classifier,
            file.candidates,
            selected,
            file.training,
        ))
    }

    pub fn to_file(&self) -> ArtifactFile {
        ArtifactFile {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_name: self.model_name().to_string(),
            feature_dimension: self.feature_dimension(),
            vectorizer: self.vectorizer.to_state(),
            classifier: self.classifier.clone(),
            candidates: self.candidates.clone(),
            training: self.training.clone(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: ArtifactFile =
            serde_json::from_str(json).map_err(|err| ArtifactError::from_json(&err))?;
        Self::from_file(file)
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string_pretty(&self.to_file()).map_err(|err| ArtifactError::Parse {
            message: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            model = artifact.model_name(),
            dimension = artifact.feature_dimension(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    /// Write the artifact atomically, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| ArtifactError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(json.as_bytes())
            .map_err(|source| ArtifactError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;
        file.sync_all().map_err(|source| ArtifactError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, path).map_err(|source| ArtifactError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), model = self.model_name(), "saved model artifact");
        Ok(())
    }

    pub fn model_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn feature_dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn fingerprint(&self) -> &str {
        self.vectorizer.fingerprint()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer<Fitted> {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &TrainedModel {
        &self.classifier
    }

    pub fn candidates(&self) -> &[CandidateReport] {
        &self.candidates
    }

    pub fn training(&self) -> &TrainingMetadata {
        &self.training
    }

    /// Held-out metrics of the selected model.
    pub fn selected_metrics(&self) -> &Metrics {
        &self.candidates[self.selected].metrics
    }

    pub fn predict_vector(&self, features: &FeatureVector) -> Result<Prediction, TrainError> {
        if features.fingerprint() != self.fingerprint() {
            return Err(FeatureError::FingerprintMismatch {
                expected: self.fingerprint().to_string(),
                actual: features.fingerprint().to_string(),
            }
            .into());
        }
        let probability = self.classifier.predict_proba(features)?;
        Ok(Prediction {
            label: Label::from_bool(probability >= crate::classifier::DECISION_THRESHOLD),
            probability,
        })
    }

    /// Vectorize preprocessed tokens with the frozen vectorizer and predict.
    pub fn predict_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Prediction, TrainError> {
        self.predict_vector(&self.vectorizer.transform(tokens))
    }
}

fn expect_equal(context: &'static str, expected: usize, actual: usize) -> Result<(), ArtifactError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ArtifactError::Incompatible {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Shared, swappable reference to the active artifact.
///
/// Readers clone the inner `Arc` and keep using it even if a newer
/// artifact is swapped in meanwhile.
#[derive(Debug)]
pub struct ArtifactHandle {
    current: RwLock<Arc<ModelArtifact>>,
}

impl ArtifactHandle {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            current: RwLock::new(Arc::new(artifact)),
        }
    }

    pub fn current(&self) -> Arc<ModelArtifact> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `next` and return the artifact it replaced.
    pub fn swap(&self, next: ModelArtifact) -> Arc<ModelArtifact> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(next))
    }

    /// Load and validate `path`, then swap it in.
    pub fn reload(&self, path: &Path) -> Result<Arc<ModelArtifact>, ArtifactError> {
        let next = ModelArtifact::load(path)?;
        Ok(self.swap(next))
    }
}
