//! Rule evaluator behavior: scenarios, single-rule violations, properties.

use ctm_model::{
    ConditionSet, Criteria, Gender, Label, PairRecord, Patient, PatientId, Trial, TrialId,
    ValidationError, condition_set,
};
use ctm_rules::{AgeStatus, LabelSummary, Pair, RuleKind, evaluate, label_all};
use proptest::prelude::*;

fn t001() -> Trial {
    let criteria = Criteria::new(
        18,
        65,
        condition_set(["type 2 diabetes"]),
        condition_set(["cardiovascular disease", "cancer"]),
    )
    .expect("valid criteria");
    Trial::new(
        TrialId::new("T001").unwrap(),
        "Adults aged 18 to 65 with type 2 diabetes; no cardiovascular disease or cancer.",
        criteria,
    )
}

fn patient(id: &str, age: u32, conditions: &[&str]) -> Patient {
    Patient::builder(PatientId::new(id).unwrap(), age, Gender::Female)
        .raw_text(format!("Synthetic patient {id}"))
        .conditions(condition_set(conditions.iter().copied()))
        .build()
}

#[test]
fn scenario_eligible_patient() {
    let evaluation = evaluate(
        &patient("P1", 45, &["type 2 diabetes", "hypertension"]),
        &t001(),
    );

    assert_eq!(evaluation.label, Label::Eligible);
    insta::assert_snapshot!(
        evaluation.reason(),
        @"Age 45 is within range [18-65]; has required condition(s): type 2 diabetes; none of the excluded conditions (cancer, cardiovascular disease) are present."
    );
    assert_eq!(evaluation.matched_terms(), vec!["type 2 diabetes"]);
    assert!(evaluation.violated_terms().is_empty());
}

#[test]
fn scenario_patient_too_old() {
    let evaluation = evaluate(&patient("P2", 70, &["type 2 diabetes"]), &t001());

    assert_eq!(evaluation.label, Label::NotEligible);
    assert_eq!(evaluation.explanation.age.status, AgeStatus::AboveMaximum);
    insta::assert_snapshot!(
        evaluation.reason(),
        @"Patient age (70) exceeds the maximum allowed age (65)."
    );
}

#[test]
fn scenario_excluded_condition_present() {
    let evaluation = evaluate(&patient("P3", 40, &["type 2 diabetes", "cancer"]), &t001());

    assert_eq!(evaluation.label, Label::NotEligible);
    assert_eq!(
        evaluation.explanation.failed_rules(),
        vec![RuleKind::ExcludedConditions]
    );
    insta::assert_snapshot!(evaluation.reason(), @"Has excluded condition(s): cancer.");
    assert_eq!(evaluation.violated_terms(), vec!["cancer"]);
}

#[test]
fn boundary_ages_are_inclusive() {
    let trial = t001();
    for age in [18, 65] {
        let evaluation = evaluate(&patient("PB", age, &["type 2 diabetes"]), &trial);
        assert_eq!(evaluation.label, Label::Eligible, "age {age}");
    }
    for age in [17, 66] {
        let evaluation = evaluate(&patient("PB", age, &["type 2 diabetes"]), &trial);
        assert_eq!(evaluation.label, Label::NotEligible, "age {age}");
    }
}

#[test]
fn below_minimum_is_explained() {
    let evaluation = evaluate(&patient("P4", 12, &["type 2 diabetes"]), &t001());
    insta::assert_snapshot!(
        evaluation.reason(),
        @"Patient age (12) is below the minimum required age (18)."
    );
}

#[test]
fn empty_conditions_fail_required_only() {
    let evaluation = evaluate(&patient("P5", 30, &[]), &t001());

    assert_eq!(
        evaluation.explanation.failed_rules(),
        vec![RuleKind::RequiredConditions]
    );
    assert!(evaluation.explanation.excluded.passed());
    assert_eq!(evaluation.violated_terms(), vec!["type 2 diabetes"]);
}

#[test]
fn empty_required_set_is_satisfied() {
    let criteria = Criteria::new(0, 120, ConditionSet::new(), ConditionSet::new()).unwrap();
    let trial = Trial::new(TrialId::new("T900").unwrap(), "Open to all", criteria);
    let evaluation = evaluate(&patient("P6", 50, &[]), &trial);

    assert_eq!(evaluation.label, Label::Eligible);
    insta::assert_snapshot!(
        evaluation.reason(),
        @"Age 50 is within range [0-120]; no specific conditions required; no exclusions apply."
    );
}

#[test]
fn multiple_failures_are_joined() {
    let evaluation = evaluate(&patient("P7", 80, &["cancer"]), &t001());
    insta::assert_snapshot!(
        evaluation.reason(),
        @"Patient age (80) exceeds the maximum allowed age (65); Missing required condition(s): type 2 diabetes; Has excluded condition(s): cancer."
    );
}

#[test]
fn condition_matching_is_normalized() {
    let evaluation = evaluate(&patient("P8", 30, &["  Type 2   DIABETES "]), &t001());
    assert_eq!(evaluation.label, Label::Eligible);
}

#[test]
fn pairs_carry_evaluator_labels() {
    let patients = vec![
        patient("P1", 45, &["type 2 diabetes"]),
        patient("P2", 70, &["type 2 diabetes"]),
    ];
    let trials = vec![t001()];
    let pairs = label_all(&patients, &trials);

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].pair_id(), "P1_T001");
    assert_eq!(pairs[0].label(), Label::Eligible);
    assert_eq!(pairs[1].label(), Label::NotEligible);

    let summary = LabelSummary::from_pairs(&pairs);
    assert_eq!(summary.pairs_created, 2);
    assert_eq!(summary.eligible_pairs, 1);
    assert!((summary.eligible_rate - 0.5).abs() < 1e-12);
}

#[test]
fn stored_pair_with_wrong_label_is_rejected() {
    let p = patient("P2", 70, &["type 2 diabetes"]);
    let trial = t001();
    let record = PairRecord {
        pair_id: Some("P2_T001".to_string()),
        patient_id: Some("P2".to_string()),
        trial_id: Some("T001".to_string()),
        label: Some(Label::Eligible),
        reason: Some("looks fine".to_string()),
    };

    let err = Pair::from_record(record, &p, &trial).unwrap_err();
    assert_eq!(
        err,
        ValidationError::LabelMismatch {
            pair_id: "P2_T001".to_string(),
            stored: 1,
            derived: 0
        }
    );
}

#[test]
fn stored_pair_round_trips() {
    let p = patient("P1", 45, &["type 2 diabetes"]);
    let trial = t001();
    let pair = Pair::derive(&p, &trial);

    let restored = Pair::from_record(pair.to_record(), &p, &trial).expect("valid pair");
    assert_eq!(restored, pair);
}

#[test]
fn stored_pair_without_label_names_field() {
    let p = patient("P1", 45, &["type 2 diabetes"]);
    let mut record = Pair::derive(&p, &t001()).to_record();
    record.label = None;

    let err = Pair::from_record(record, &p, &t001()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingField {
            record: "pair",
            field: "label"
        }
    );
}

const VOCABULARY: &[&str] = &[
    "asthma",
    "cancer",
    "copd",
    "depression",
    "hypertension",
    "obesity",
    "type 2 diabetes",
];

fn arb_trial() -> impl Strategy<Value = Trial> {
    (
        0u32..60,
        0u32..60,
        prop::sample::subsequence(VOCABULARY, 0..3),
        prop::sample::subsequence(VOCABULARY, 0..3),
    )
        .prop_map(|(min, span, required, excluded)| {
            let excluded: Vec<&str> = excluded
                .into_iter()
                .filter(|name| !required.contains(name))
                .collect();
            let criteria = Criteria::new(
                min,
                min + span,
                condition_set(required),
                condition_set(excluded),
            )
            .expect("ordered ages");
            Trial::new(TrialId::new("TP").unwrap(), "generated", criteria)
        })
}

fn eligible_patient(trial: &Trial, age_offset: u32, extra: &[&str]) -> Patient {
    let criteria = trial.criteria();
    let span = criteria.max_age() - criteria.min_age();
    let age = criteria.min_age() + age_offset % (span + 1);
    let mut conditions = criteria.required_conditions().clone();
    for name in condition_set(extra.iter().copied()) {
        if !criteria.excluded_conditions().contains(&name) {
            conditions.insert(name);
        }
    }
    Patient::builder(PatientId::new("PP").unwrap(), age, Gender::Other)
        .conditions(conditions)
        .build()
}

proptest! {
    #[test]
    fn all_rules_satisfied_means_eligible(
        trial in arb_trial(),
        offset in 0u32..200,
        extra in prop::sample::subsequence(VOCABULARY, 0..3),
    ) {
        let p = eligible_patient(&trial, offset, &extra);
        let evaluation = evaluate(&p, &trial);
        prop_assert_eq!(evaluation.label, Label::Eligible);
        prop_assert!(evaluation.explanation.failed_rules().is_empty());
    }

    #[test]
    fn single_age_violation_is_named(trial in arb_trial(), above in any::<bool>(), offset in 1u32..10) {
        let criteria = trial.criteria();
        prop_assume!(above || criteria.min_age() >= offset);
        let age = if above { criteria.max_age() + offset } else { criteria.min_age() - offset };
        let p = Patient::builder(PatientId::new("PA").unwrap(), age, Gender::Male)
            .conditions(criteria.required_conditions().clone())
            .build();
        let evaluation = evaluate(&p, &trial);
        prop_assert_eq!(evaluation.label, Label::NotEligible);
        prop_assert_eq!(evaluation.explanation.failed_rules(), vec![RuleKind::Age]);
        prop_assert!(evaluation.reason().contains("age"));
    }

    #[test]
    fn single_missing_required_is_named(trial in arb_trial(), offset in 0u32..200, which in any::<prop::sample::Index>()) {
        let required: Vec<_> = trial.criteria().required_conditions().iter().cloned().collect();
        prop_assume!(!required.is_empty());
        let mut p = eligible_patient(&trial, offset, &[]);
        let removed = which.get(&required).clone();
        let mut conditions = p.conditions().clone();
        conditions.remove(&removed);
        p = Patient::builder(p.id().clone(), p.age(), p.gender()).conditions(conditions).build();

        let evaluation = evaluate(&p, &trial);
        prop_assert_eq!(evaluation.label, Label::NotEligible);
        prop_assert_eq!(evaluation.explanation.failed_rules(), vec![RuleKind::RequiredConditions]);
        prop_assert!(evaluation.reason().contains(removed.as_str()));
    }

    #[test]
    fn single_excluded_present_is_named(trial in arb_trial(), offset in 0u32..200, pick in any::<prop::sample::Index>()) {
        let excluded: Vec<_> = trial.criteria().excluded_conditions().iter().cloned().collect();
        prop_assume!(!excluded.is_empty());
        let p = eligible_patient(&trial, offset, &[]);
        let added = pick.get(&excluded).clone();
        let mut conditions = p.conditions().clone();
        conditions.insert(added.clone());
        let p = Patient::builder(p.id().clone(), p.age(), p.gender()).conditions(conditions).build();

        let evaluation = evaluate(&p, &trial);
        prop_assert_eq!(evaluation.label, Label::NotEligible);
        prop_assert_eq!(evaluation.explanation.failed_rules(), vec![RuleKind::ExcludedConditions]);
        prop_assert!(evaluation.reason().contains(added.as_str()));
    }

    #[test]
    fn evaluation_is_deterministic(trial in arb_trial(), offset in 0u32..200) {
        let p = eligible_patient(&trial, offset, &["asthma"]);
        prop_assert_eq!(evaluate(&p, &trial), evaluate(&p, &trial));
    }
}
