//! Best-effort masking of identifying spans in narrative text.
//!
//! Person names are detected as runs of capitalized words that are not in
//! the clinical/grammatical lexicon ([`crate::lexicon::is_known_capitalized`]).
//! Age mentions such as `54 years old`, `54-year-old`, `aged 54` and `54 yo`
//! are detected by pattern. Email addresses, phone numbers and digit runs of
//! seven or more (record numbers) are masked as well. Matches become
//! [`NAME_TOKEN`], [`AGE_TOKEN`], [`EMAIL_TOKEN`], [`PHONE_TOKEN`] and
//! [`RECORD_NUMBER_TOKEN`].
//!
//! This is a heuristic privacy gate, not a guarantee: spans that match no
//! pattern pass through unchanged. [`AnonymizeReport::review_flag`] marks
//! outputs that still look like they carry an identifier (mixed-case words
//! such as `McArthur`, stray `@` addresses, years, shorter digit runs) so
//! they can be reviewed; it never turns into an error.
//!
//! `anonymize(anonymize(x)) == anonymize(x)` holds because every token is
//! all-caps (never a name candidate), digit-free and `@`-free (never an age,
//! contact or record candidate), and every match starts and ends on a word
//! character, so swapping it for a token moves no word boundary.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::lexicon::is_known_capitalized;

pub const NAME_TOKEN: &str = "PATIENT_NAME";
pub const AGE_TOKEN: &str = "AGE";
pub const EMAIL_TOKEN: &str = "EMAIL";
pub const PHONE_TOKEN: &str = "PHONE";
pub const RECORD_NUMBER_TOKEN: &str = "RECORD_NUMBER";

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b\d{1,3}\s*-?\s*years?\s*-?\s*old\b",
        r"(?i)\baged\s+\d{1,3}\b",
        r"(?i)\b\d{1,3}\s*(?:yo|y/o)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("age pattern"))
    .collect()
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-. ]\d{3}[-. ]\d{4}\b").expect("phone number")
});

static RECORD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{7,}\b").expect("record number"));

static NAME_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*\b").expect("name run"));

static NAME_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+").expect("name word"));

static RESIDUAL_HINTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b\d{1,3}\s*(?:yrs?|y)\b",
        r"\b(?:19|20)\d{2}\b",
        r"\b\d{5,6}\b",
        r"\b[A-Z][a-z]*[A-Z][a-z]+\b",
        r"\S@\S",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("residual pattern"))
    .collect()
});

/// Outcome of one anonymization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizeReport {
    pub text: String,
    pub names_masked: usize,
    pub ages_masked: usize,
    /// Emails and phone numbers.
    pub contacts_masked: usize,
    pub record_numbers_masked: usize,
    /// Set when the output still contains something that looks identifying.
    pub review_flag: bool,
}

/// Mask identifying spans, returning only the text.
pub fn anonymize(text: &str) -> String {
    anonymize_report(text).text
}

/// Mask identifying spans and report what was masked.
pub fn anonymize_report(text: &str) -> AnonymizeReport {
    let mut ages_masked = 0;
    let mut current = text.to_string();
    for pattern in AGE_PATTERNS.iter() {
        ages_masked += mask(&mut current, pattern, AGE_TOKEN);
    }
    let phones_masked = mask(&mut current, &PHONE, PHONE_TOKEN);
    let record_numbers_masked = mask(&mut current, &RECORD_NUMBER, RECORD_NUMBER_TOKEN);
    let contacts_masked = phones_masked + mask(&mut current, &EMAIL, EMAIL_TOKEN);

    let (current, names_masked) = mask_names(&current);

    let residual_hints = RESIDUAL_HINTS
        .iter()
        .filter(|pattern| pattern.is_match(&current))
        .count();
    let review_flag = residual_hints > 0;
    if review_flag {
        warn!(
            residual_hints,
            names_masked,
            ages_masked,
            contacts_masked,
            record_numbers_masked,
            "anonymized text still contains a possible identifier"
        );
    }

    AnonymizeReport {
        text: current,
        names_masked,
        ages_masked,
        contacts_masked,
        record_numbers_masked,
        review_flag,
    }
}

/// Replace matches until none remain; a token can complete a new match
/// (`a@b.co@c.de`).
fn mask(text: &mut String, pattern: &Regex, token: &str) -> usize {
    let mut masked = 0;
    loop {
        let count = pattern.find_iter(text).count();
        if count == 0 {
            return masked;
        }
        masked += count;
        *text = pattern.replace_all(text, token).into_owned();
    }
}

fn mask_names(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut masked = 0;
    let mut last = 0;

    for run in NAME_RUN.find_iter(text) {
        let words: Vec<_> = NAME_WORD.find_iter(run.as_str()).collect();
        let unknown: Vec<_> = words
            .iter()
            .filter(|word| !is_known_capitalized(word.as_str()))
            .collect();
        let (Some(first), Some(last_unknown)) = (unknown.first(), unknown.last()) else {
            continue;
        };

        let start = run.start() + first.start();
        let end = run.start() + last_unknown.end();
        out.push_str(&text[last..start]);
        out.push_str(NAME_TOKEN);
        last = end;
        masked += 1;
    }

    out.push_str(&text[last..]);
    (out, masked)
}
