//! Validation errors raised at the record boundary.

use thiserror::Error;

/// A malformed or inconsistent patient, trial or pair record.
///
/// Every variant names the record kind and, where one applies, the field
/// that failed so callers can diagnose without inspecting the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("{record} record is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// A field is present but its value is unusable.
    #[error("{record} record has invalid `{field}`: {message}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        message: String,
    },

    /// Trial age bounds are inverted.
    #[error("trial age range is inverted: min_age {min_age} > max_age {max_age}")]
    AgeRange { min_age: u32, max_age: u32 },

    /// A stored pair label disagrees with the rule evaluator.
    #[error("pair {pair_id} stores label {stored} but the rules derive {derived}")]
    LabelMismatch {
        pair_id: String,
        stored: u8,
        derived: u8,
    },

    /// A stored pair id does not match its patient/trial key.
    #[error("pair id {pair_id} does not match key {expected}")]
    PairKey { pair_id: String, expected: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
