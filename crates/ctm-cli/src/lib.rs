//! CLI library components for the trial matcher.

pub mod logging;
