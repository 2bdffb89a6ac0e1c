//! TF-IDF feature extraction over preprocessed token streams.
//!
//! A fitted vectorizer is immutable and carries a fingerprint derived
//! from its configuration, vocabulary, and idf weights. Every vector it
//! produces is tagged with that fingerprint so vectors from different
//! vocabularies are never compared.

pub mod config;
pub mod error;
pub mod extractor;
pub mod vector;
pub mod vectorizer;

pub use config::TfidfConfig;
pub use error::{FeatureError, Result};
pub use extractor::FeatureExtractor;
pub use vector::{FeatureVector, cosine_similarity};
pub use vectorizer::{Fitted, TfidfVectorizer, Unfit, VectorizerState, fingerprint};
