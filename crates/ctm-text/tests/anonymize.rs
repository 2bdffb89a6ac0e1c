//! Property tests for the anonymizer and preprocessor.

use ctm_text::{anonymize, anonymize_report, clean_tokens, preprocess};
use proptest::prelude::*;

fn narrative() -> impl Strategy<Value = String> {
    let names = prop::sample::select(vec![
        "John Doe", "Maria Lopez", "Ahmed", "Patient", "Dr Smith", "Mary Ann Jones",
    ]);
    let ages = prop::sample::select(vec![
        "54 years old", "54-year-old", "aged 33", "7 yo", "61 year old", "age unknown",
    ]);
    let conditions = prop::sample::select(vec![
        "type 2 diabetes", "Hypertension", "COPD", "Parkinson's disease", "cancer",
    ]);
    (names, ages, conditions, "[A-Za-z0-9 ,.'/-]{0,40}").prop_map(|(name, age, condition, noise)| {
        format!("{name}, {age}, diagnosed with {condition}. {noise}")
    })
}

proptest! {
    #[test]
    fn anonymize_is_idempotent_on_narratives(text in narrative()) {
        let once = anonymize(&text);
        prop_assert_eq!(anonymize(&once), once);
    }

    #[test]
    fn anonymize_is_idempotent_on_arbitrary_text(text in "\\PC{0,120}") {
        let once = anonymize(&text);
        prop_assert_eq!(anonymize(&once), once);
    }

    #[test]
    fn second_pass_masks_nothing(text in narrative()) {
        let once = anonymize(&text);
        let report = anonymize_report(&once);
        prop_assert_eq!(report.names_masked, 0);
        prop_assert_eq!(report.ages_masked, 0);
        prop_assert_eq!(report.contacts_masked, 0);
        prop_assert_eq!(report.record_numbers_masked, 0);
    }

    #[test]
    fn preprocess_is_deterministic(text in "\\PC{0,120}") {
        prop_assert_eq!(preprocess(&text), preprocess(&text));
    }
}

#[test]
fn scenario_name_and_age_are_replaced() {
    let text = "John Doe, 54 years old, diagnosed with diabetes";
    assert_eq!(anonymize(text), "PATIENT_NAME, AGE, diagnosed with diabetes");
}

#[test]
fn condition_terms_are_preserved() {
    let out = anonymize("Ahmed Khan, a 38-year-old, has chronic kidney disease");
    assert!(out.contains("chronic kidney disease"));
    assert!(!out.contains("Ahmed"));
    assert!(!out.contains("38"));
}

#[test]
fn clean_tokens_anonymize_before_preprocessing() {
    assert_eq!(
        clean_tokens("John Doe, 54 years old, diagnosed with diabetes"),
        vec!["patient_name", "age", "diagnose", "diabetes"]
    );
}

#[test]
fn scenario_contact_details_are_masked() {
    let report = anonymize_report(
        "Seen by Dr Okafor. Contact j.okafor@clinic.org or 555.010.2000, MRN 4410023.",
    );
    assert_eq!(
        report.text,
        "Seen by Dr PATIENT_NAME. Contact EMAIL or PHONE, MRN RECORD_NUMBER."
    );
    assert!(!report.review_flag);
}
