//! Generator reproducibility, intent coverage, and balancing.

use std::collections::{BTreeMap, BTreeSet};

use ctm_model::{Label, Labeled, Trial, TrialId};
use ctm_rules::{RuleKind, evaluate};
use ctm_synth::{
    BalanceConfig, BalanceError, GenerateError, GeneratorConfig, Intent, SYNTHETIC_SOURCE,
    ViolationKind, balance, builtin_trials, generate,
};
use proptest::prelude::*;

fn config(count: usize) -> GeneratorConfig {
    GeneratorConfig::default()
        .with_seed(42)
        .with_patient_count(count)
}

#[test]
fn same_seed_reproduces_output() {
    let trials = builtin_trials().unwrap();
    let first = generate(&config(60), &trials).unwrap();
    let second = generate(&config(60), &trials).unwrap();

    assert_eq!(first.patients, second.patients);
    assert_eq!(first.pairs, second.pairs);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn different_seed_changes_output() {
    let trials = builtin_trials().unwrap();
    let first = generate(&config(30), &trials).unwrap();
    let second = generate(&config(30).with_seed(7), &trials).unwrap();

    assert_ne!(first.patients, second.patients);
}

#[test]
fn prefix_is_stable_when_count_grows() {
    let trials = builtin_trials().unwrap();
    let short = generate(&config(10), &trials).unwrap();
    let long = generate(&config(25), &trials).unwrap();

    assert_eq!(short.patients[..], long.patients[..10]);
}

#[test]
fn every_patient_meets_its_intent() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(300), &trials).unwrap();

    for (patient, target) in generated.patients.iter().zip(&generated.targets) {
        let trial = trials
            .iter()
            .find(|trial| trial.id() == &target.trial_id)
            .unwrap();
        let evaluation = evaluate(patient, trial);
        let expected = match target.intent {
            Intent::Eligible => vec![],
            Intent::Violate(ViolationKind::AgeOutOfRange) => vec![RuleKind::Age],
            Intent::Violate(ViolationKind::MissingRequired) => vec![RuleKind::RequiredConditions],
            Intent::Violate(ViolationKind::ExcludedPresent) => vec![RuleKind::ExcludedConditions],
        };
        assert_eq!(
            evaluation.explanation.failed_rules(),
            expected,
            "{} against {}",
            patient.id(),
            trial.id()
        );
    }
}

#[test]
fn all_violation_kinds_are_produced() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(120), &trials).unwrap();

    for key in ["eligible", "age_out_of_range", "missing_required", "excluded_present"] {
        assert!(
            generated.summary.intents.get(key).copied().unwrap_or(0) > 0,
            "no {key} patients"
        );
    }
}

#[test]
fn every_trial_gets_every_intent() {
    let template = builtin_trials().unwrap().remove(0);
    for trial_count in 2..=4 {
        let trials: Vec<Trial> = (0..trial_count)
            .map(|n| {
                Trial::new(
                    TrialId::new(format!("T{n}")).unwrap(),
                    template.eligibility_text(),
                    template.criteria().clone(),
                )
            })
            .collect();
        let generated = generate(&config(300), &trials).unwrap();

        let mut per_trial: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        for target in &generated.targets {
            per_trial
                .entry(target.trial_id.to_string())
                .or_default()
                .insert(target.intent.as_str());
        }
        assert_eq!(per_trial.len(), trial_count);
        for (trial_id, intents) in &per_trial {
            assert_eq!(
                intents.len(),
                4,
                "{trial_id} of {trial_count} trials only got {intents:?}"
            );
        }
    }
}

#[test]
fn boundary_ages_are_sampled() {
    let trials = builtin_trials().unwrap();
    let t001 = &trials[..1];
    let generated = generate(&config(400), t001).unwrap();
    let ages: Vec<u32> = generated.patients.iter().map(|p| p.age()).collect();

    assert!(ages.contains(&18) || ages.contains(&65));
    assert!(ages.contains(&17) || ages.contains(&66));
}

#[test]
fn pairs_cover_every_trial_with_rule_labels() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(20), &trials).unwrap();

    assert_eq!(generated.pairs.len(), 20 * trials.len());
    assert_eq!(generated.summary.pairs_created, generated.pairs.len());
    for pair in &generated.pairs {
        let patient = generated
            .patients
            .iter()
            .find(|p| p.id() == pair.patient_id())
            .unwrap();
        let trial = trials.iter().find(|t| t.id() == pair.trial_id()).unwrap();
        assert_eq!(pair.label(), evaluate(patient, trial).label);
    }
}

#[test]
fn generated_patients_are_tagged() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(5), &trials).unwrap();

    assert_eq!(generated.patients[0].id().as_str(), "P_SYN_00000");
    assert_eq!(generated.patients[4].id().as_str(), "P_SYN_00004");
    assert!(
        generated
            .patients
            .iter()
            .all(|p| p.source() == Some(SYNTHETIC_SOURCE) && !p.raw_text().is_empty())
    );
}

#[test]
fn negated_conditions_never_overlap_positive_ones() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(100), &trials).unwrap();

    for patient in &generated.patients {
        assert!(patient.conditions().is_disjoint(patient.negated_conditions()));
    }
}

#[test]
fn generation_without_trials_fails() {
    assert_eq!(
        generate(&config(5), &[]).unwrap_err(),
        GenerateError::NoTrials
    );
}

#[test]
fn balancing_generated_pairs_hits_target() {
    let trials = builtin_trials().unwrap();
    let generated = generate(&config(80), &trials).unwrap();
    let balanced = balance(&generated.pairs, &BalanceConfig::default()).unwrap();

    assert_eq!(balanced.eligible, balanced.not_eligible);
    assert!((balanced.ratio - 0.5).abs() <= 0.02);
    assert_eq!(
        balanced.items.len() + balanced.dropped,
        generated.pairs.len()
    );
}

#[test]
fn balancing_one_class_is_an_error() {
    let labels = vec![Label::Eligible; 4];
    assert_eq!(
        balance(&labels, &BalanceConfig::default()).unwrap_err(),
        BalanceError::InsufficientData {
            eligible: 4,
            not_eligible: 0
        }
    );
}

#[test]
fn balancing_rejects_degenerate_ratio() {
    let labels = vec![Label::Eligible, Label::NotEligible];
    let config = BalanceConfig::default().with_target_ratio(1.0);
    assert!(matches!(
        balance(&labels, &config),
        Err(BalanceError::InvalidRatio { .. })
    ));
}

#[test]
fn balancing_reports_unreachable_tolerance() {
    let labels = vec![Label::Eligible, Label::NotEligible, Label::NotEligible];
    let config = BalanceConfig::default()
        .with_target_ratio(0.4)
        .with_tolerance(0.0);
    assert!(matches!(
        balance(&labels, &config),
        Err(BalanceError::ToleranceExceeded { .. })
    ));
}

#[derive(Debug, Clone, PartialEq)]
struct Item {
    position: usize,
    label: Label,
}

impl Labeled for Item {
    fn label(&self) -> Label {
        self.label
    }
}

proptest! {
    #[test]
    fn balanced_output_is_ordered_subset(
        flags in prop::collection::vec(any::<bool>(), 2..200),
        seed in any::<u64>(),
    ) {
        prop_assume!(flags.iter().any(|f| *f) && flags.iter().any(|f| !*f));
        let items: Vec<Item> = flags
            .iter()
            .enumerate()
            .map(|(position, eligible)| Item { position, label: Label::from_bool(*eligible) })
            .collect();

        let balanced = balance(&items, &BalanceConfig::default().with_seed(seed)).unwrap();

        prop_assert_eq!(balanced.eligible, balanced.not_eligible);
        prop_assert!(balanced.items.windows(2).all(|w| w[0].position < w[1].position));
        for item in &balanced.items {
            prop_assert_eq!(&items[item.position], item);
        }
        let minority = flags.iter().filter(|f| **f).count().min(flags.iter().filter(|f| !**f).count());
        prop_assert_eq!(balanced.items.len(), 2 * minority);
    }

    #[test]
    fn balancing_is_seed_deterministic(
        flags in prop::collection::vec(any::<bool>(), 2..100),
        seed in any::<u64>(),
    ) {
        prop_assume!(flags.iter().any(|f| *f) && flags.iter().any(|f| !*f));
        let labels: Vec<Label> = flags.into_iter().map(Label::from_bool).collect();
        let config = BalanceConfig::default().with_seed(seed);
        prop_assert_eq!(balance(&labels, &config).unwrap(), balance(&labels, &config).unwrap());
    }
}
