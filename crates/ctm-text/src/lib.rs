#![deny(unsafe_code)]

pub mod anonymize;
pub mod lexicon;
pub mod preprocess;

pub use anonymize::{
    AGE_TOKEN, AnonymizeReport, EMAIL_TOKEN, NAME_TOKEN, PHONE_TOKEN, RECORD_NUMBER_TOKEN,
    anonymize, anonymize_report,
};
pub use preprocess::{lemmatize, preprocess, preprocess_joined};

/// Anonymize then preprocess: the only path by which narrative text reaches
/// a vectorizer.
pub fn clean_tokens(text: &str) -> Vec<String> {
    preprocess(&anonymize(text))
}
