//! Eligibility decisions and the end-to-end training pipeline.
//!
//! Training and inference share [`pair_tokens`], so the model always sees
//! text prepared the same way.

#![deny(unsafe_code)]

pub mod decision;
pub mod error;
pub mod pipeline;
pub mod sample;

pub use decision::{DecisionEngine, DecisionResult, rank_by_probability};
pub use error::{DecisionError, PipelineError};
pub use pipeline::{PipelineOptions, PipelineReport, Samples, build_samples, run_training};
pub use sample::{Sample, pair_tokens};
