//! Canonical token stream for vectorization.
//!
//! lowercase → tokenize → drop short tokens and stopwords → lemmatize.
//! Patient and trial text go through the same function so the vocabulary
//! sees one token distribution.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{irregular_lemma, is_invariant_plural, is_stopword};

/// Tokens of this many characters or fewer are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9_]+").expect("token"));

pub fn preprocess(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|token| token.as_str())
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .filter(|token| !is_stopword(token))
        .map(lemmatize)
        .collect()
}

/// Preprocess and join tokens with single spaces.
pub fn preprocess_joined(text: &str) -> String {
    preprocess(text).join(" ")
}

/// Rule-based lemma for a lowercase token.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = irregular_lemma(token) {
        return lemma.to_string();
    }
    if is_invariant_plural(token) {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = token.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if token.len() > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_rules() {
        assert_eq!(lemmatize("conditions"), "condition");
        assert_eq!(lemmatize("therapies"), "therapy");
        assert_eq!(lemmatize("glasses"), "glass");
        assert_eq!(lemmatize("diabetes"), "diabetes");
        assert_eq!(lemmatize("arthritis"), "arthritis");
        assert_eq!(lemmatize("sinus"), "sinus");
        assert_eq!(lemmatize("women"), "woman");
    }

    #[test]
    fn drops_short_tokens_and_stopwords() {
        assert_eq!(
            preprocess("Patient is a AGE male with type 2 diabetes and hypertension."),
            vec!["patient", "age", "male", "type", "diabetes", "hypertension"]
        );
    }

    #[test]
    fn placeholders_survive() {
        insta::assert_snapshot!(
            preprocess_joined("PATIENT_NAME, AGE, diagnosed with diabetes"),
            @"patient_name age diagnose diabetes"
        );
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(preprocess("  . , ;").is_empty());
    }
}
