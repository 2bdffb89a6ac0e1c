//! Synthetic patient generation and class balancing.
//!
//! Generated patients are always labeled through `ctm-rules`, so the
//! generator can aim for a label but never assign one.

pub mod balance;
pub mod catalog;
pub mod error;
pub mod generator;
pub mod vocabulary;

pub use balance::{BalanceConfig, Balanced, balance};
pub use catalog::builtin_trials;
pub use error::{BalanceError, GenerateError};
pub use generator::{
    GenerationSummary, Generated, GeneratorConfig, Intent, MAX_GENERATED_AGE, SYNTHETIC_SOURCE,
    Target, TrialCounts, ViolationKind, generate, unit_seed,
};
pub use vocabulary::Vocabulary;
