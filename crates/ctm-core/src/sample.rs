//! Text shared by training and inference.

use serde::Serialize;

use ctm_model::{Label, Labeled, Patient, Trial};
use ctm_text::clean_tokens;

/// Tokens for a patient–trial pair.
///
/// Both texts are cleaned on their own before being joined, so a name at
/// the end of one text never merges with the start of the other.
pub fn pair_tokens(patient: &Patient, trial: &Trial) -> Vec<String> {
    let mut tokens = clean_tokens(patient.raw_text());
    tokens.extend(clean_tokens(trial.eligibility_text()));
    tokens
}

/// One labeled training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub pair_id: String,
    pub label: Label,
    pub tokens: Vec<String>,
}

impl Labeled for Sample {
    fn label(&self) -> Label {
        self.label
    }
}
