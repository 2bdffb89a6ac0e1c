//! Error types for generation and balancing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// Generation needs at least one trial to target.
    #[error("cannot generate patients without trials")]
    NoTrials,

    /// A configuration value is out of range.
    #[error("invalid generator config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    /// One class has no members, so no balanced subset exists.
    #[error("insufficient data to balance: {eligible} eligible, {not_eligible} not eligible")]
    InsufficientData {
        eligible: usize,
        not_eligible: usize,
    },

    /// Target ratio must lie strictly between 0 and 1.
    #[error("target ratio {ratio} must be strictly between 0 and 1")]
    InvalidRatio { ratio: f64 },

    /// Tolerance must be non-negative.
    #[error("tolerance {tolerance} must be non-negative")]
    InvalidTolerance { tolerance: f64 },

    /// The input is too small to land within tolerance of the target.
    #[error("balanced ratio {achieved:.4} is outside {target} ± {tolerance}")]
    ToleranceExceeded {
        achieved: f64,
        target: f64,
        tolerance: f64,
    },
}
