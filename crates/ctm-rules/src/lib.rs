#![deny(unsafe_code)]

pub mod evaluate;
pub mod pair;

pub use evaluate::{
    AgeOutcome, AgeStatus, Evaluation, ExcludedOutcome, Explanation, RequiredOutcome, RuleKind,
    RuleLine, evaluate,
};
pub use pair::{LabelSummary, Pair, label_all};
