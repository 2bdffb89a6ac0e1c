//! Seeded synthetic patient generation.
//!
//! Every patient is produced by an independent generation unit whose
//! random stream is derived from `(seed, index)`. The output for a given
//! seed, configuration, and trial list is therefore byte-for-byte stable
//! regardless of how units are scheduled.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ctm_model::{
    ConditionName, ConditionSet, Criteria, Gender, Label, Patient, PatientId, Trial, TrialId,
};
use ctm_rules::{Pair, label_all};

use crate::error::GenerateError;
use crate::vocabulary::{FIRST_NAMES, LAST_NAMES, TEMPLATES, Vocabulary};

/// Upper bound for any generated age.
pub const MAX_GENERATED_AGE: u32 = 120;

/// Source tag stamped on every generated patient.
pub const SYNTHETIC_SOURCE: &str = "synthetic_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub patient_count: usize,
    /// Fraction of patients constructed to satisfy their target trial.
    pub eligible_fraction: f64,
    /// Chance an in-range age lands exactly on `min_age` or `max_age`.
    pub boundary_probability: f64,
    /// Chance an out-of-range age sits one year outside the range.
    pub near_boundary_probability: f64,
    /// Chance the narrative opens with a fictitious full name.
    pub name_probability: f64,
    pub population_min_age: u32,
    pub population_max_age: u32,
    pub id_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            patient_count: 100,
            eligible_fraction: 0.5,
            boundary_probability: 0.25,
            near_boundary_probability: 0.5,
            name_probability: 0.3,
            population_min_age: 18,
            population_max_age: 85,
            id_prefix: "P_SYN".to_string(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_patient_count(mut self, count: usize) -> Self {
        self.patient_count = count;
        self
    }

    #[must_use]
    pub fn with_eligible_fraction(mut self, fraction: f64) -> Self {
        self.eligible_fraction = fraction;
        self
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        let probabilities = [
            ("eligible_fraction", self.eligible_fraction),
            ("boundary_probability", self.boundary_probability),
            ("near_boundary_probability", self.near_boundary_probability),
            ("name_probability", self.name_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(GenerateError::InvalidConfig {
                    field,
                    message: format!("{value} is not within [0, 1]"),
                });
            }
        }
        if self.population_min_age > self.population_max_age {
            return Err(GenerateError::InvalidConfig {
                field: "population_min_age",
                message: format!(
                    "{} exceeds population_max_age {}",
                    self.population_min_age, self.population_max_age
                ),
            });
        }
        if self.population_max_age > MAX_GENERATED_AGE {
            return Err(GenerateError::InvalidConfig {
                field: "population_max_age",
                message: format!("must not exceed {MAX_GENERATED_AGE}"),
            });
        }
        if self.id_prefix.trim().is_empty() {
            return Err(GenerateError::InvalidConfig {
                field: "id_prefix",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// The single rule an ineligible patient is built to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    AgeOutOfRange,
    MissingRequired,
    ExcludedPresent,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 3] = [
        ViolationKind::AgeOutOfRange,
        ViolationKind::MissingRequired,
        ViolationKind::ExcludedPresent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::AgeOutOfRange => "age_out_of_range",
            ViolationKind::MissingRequired => "missing_required",
            ViolationKind::ExcludedPresent => "excluded_present",
        }
    }

    fn feasible(self, criteria: &Criteria) -> bool {
        match self {
            ViolationKind::AgeOutOfRange => {
                criteria.min_age() > 0 || criteria.max_age() < MAX_GENERATED_AGE
            }
            ViolationKind::MissingRequired => !criteria.required_conditions().is_empty(),
            ViolationKind::ExcludedPresent => criteria
                .excluded_conditions()
                .iter()
                .any(|name| !criteria.required_conditions().contains(name)),
        }
    }
}

/// What a generation unit set out to build against its target trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "violation", rename_all = "snake_case")]
pub enum Intent {
    Eligible,
    Violate(ViolationKind),
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Eligible => "eligible",
            Intent::Violate(kind) => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub patient_id: PatientId,
    pub trial_id: TrialId,
    pub intent: Intent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrialCounts {
    pub eligible: usize,
    pub not_eligible: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub patients_generated: usize,
    pub pairs_created: usize,
    pub eligible_pairs: usize,
    pub per_trial: BTreeMap<String, TrialCounts>,
    pub intents: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub patients: Vec<Patient>,
    pub pairs: Vec<Pair>,
    pub targets: Vec<Target>,
    pub summary: GenerationSummary,
}

/// Generate `config.patient_count` patients and label them against every trial.
pub fn generate(config: &GeneratorConfig, trials: &[Trial]) -> Result<Generated, GenerateError> {
    config.validate()?;
    if trials.is_empty() {
        return Err(GenerateError::NoTrials);
    }

    let vocabulary = Vocabulary::for_trials(trials);
    let mut patients = Vec::with_capacity(config.patient_count);
    let mut targets = Vec::with_capacity(config.patient_count);
    for index in 0..config.patient_count {
        let trial = &trials[index % trials.len()];
        let slot = index / trials.len();
        let (patient, intent) = generate_unit(config, &vocabulary, trial, index, slot)?;
        debug!(
            patient_id = %patient.id(),
            trial_id = %trial.id(),
            intent = intent.as_str(),
            "generated patient"
        );
        targets.push(Target {
            patient_id: patient.id().clone(),
            trial_id: trial.id().clone(),
            intent,
        });
        patients.push(patient);
    }

    let pairs = label_all(&patients, trials);
    let summary = summarize(&patients, &pairs, &targets);
    info!(
        patients = summary.patients_generated,
        pairs = summary.pairs_created,
        eligible_pairs = summary.eligible_pairs,
        seed = config.seed,
        "synthetic generation complete"
    );
    Ok(Generated {
        patients,
        pairs,
        targets,
        summary,
    })
}

fn summarize(patients: &[Patient], pairs: &[Pair], targets: &[Target]) -> GenerationSummary {
    let mut summary = GenerationSummary {
        patients_generated: patients.len(),
        pairs_created: pairs.len(),
        ..GenerationSummary::default()
    };
    for pair in pairs {
        let counts = summary
            .per_trial
            .entry(pair.trial_id().to_string())
            .or_default();
        match pair.label() {
            Label::Eligible => {
                counts.eligible += 1;
                summary.eligible_pairs += 1;
            }
            Label::NotEligible => counts.not_eligible += 1,
        }
    }
    for target in targets {
        *summary
            .intents
            .entry(target.intent.as_str().to_string())
            .or_default() += 1;
    }
    summary
}

/// Stream seed for one generation unit.
pub fn unit_seed(seed: u64, index: usize) -> u64 {
    splitmix64(seed ^ splitmix64(index as u64))
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Whether the trial's `slot`-th patient is an eligible target under `fraction`.
///
/// Spreads eligible targets evenly so the first `n` patients of a trial
/// hold `floor(n * fraction)` of them.
fn is_eligible_slot(slot: usize, fraction: f64) -> bool {
    let before = (slot as f64 * fraction).floor();
    let after = ((slot + 1) as f64 * fraction).floor();
    after > before
}

/// Intent for the trial's `slot`-th patient; violations cycle per trial.
fn plan_intent(slot: usize, fraction: f64, criteria: &Criteria) -> Intent {
    if is_eligible_slot(slot, fraction) {
        return Intent::Eligible;
    }
    let eligible_before = (slot as f64 * fraction).floor() as usize;
    let ordinal = slot - eligible_before.min(slot);
    (0..ViolationKind::ALL.len())
        .map(|offset| ViolationKind::ALL[(ordinal + offset) % ViolationKind::ALL.len()])
        .find(|kind| kind.feasible(criteria))
        .map_or(Intent::Eligible, Intent::Violate)
}

fn generate_unit(
    config: &GeneratorConfig,
    vocabulary: &Vocabulary,
    trial: &Trial,
    index: usize,
    slot: usize,
) -> Result<(Patient, Intent), GenerateError> {
    let mut rng = StdRng::seed_from_u64(unit_seed(config.seed, index));
    let criteria = trial.criteria();
    let intent = plan_intent(slot, config.eligible_fraction, criteria);

    let age = match intent {
        Intent::Violate(ViolationKind::AgeOutOfRange) => out_of_range_age(&mut rng, criteria, config),
        _ => in_range_age(&mut rng, criteria, config),
    };
    let gender = Gender::ALL[rng.random_range(0..Gender::ALL.len())];
    let conditions = sample_conditions(&mut rng, vocabulary, criteria, intent);
    let negated = sample_negated(&mut rng, vocabulary, criteria, &conditions);
    let raw_text = narrative(&mut rng, config, age, gender, &conditions, &negated);

    let id = PatientId::new(format!("{}_{index:05}", config.id_prefix.trim())).map_err(|err| {
        GenerateError::InvalidConfig {
            field: "id_prefix",
            message: err.to_string(),
        }
    })?;
    let patient = Patient::builder(id, age, gender)
        .raw_text(raw_text)
        .conditions(conditions)
        .negated_conditions(negated)
        .source(SYNTHETIC_SOURCE)
        .build();
    Ok((patient, intent))
}

fn in_range_age(rng: &mut StdRng, criteria: &Criteria, config: &GeneratorConfig) -> u32 {
    let (min, max) = (criteria.min_age(), criteria.max_age());
    if rng.random_bool(config.boundary_probability) {
        if rng.random_bool(0.5) { min } else { max }
    } else {
        rng.random_range(min..=max)
    }
}

fn out_of_range_age(rng: &mut StdRng, criteria: &Criteria, config: &GeneratorConfig) -> u32 {
    let (min, max) = (criteria.min_age(), criteria.max_age());
    let can_go_below = min > 0;
    let can_go_above = max < MAX_GENERATED_AGE;
    let below = match (can_go_below, can_go_above) {
        (true, true) => rng.random_bool(0.5),
        (true, false) => true,
        _ => false,
    };
    let near = rng.random_bool(config.near_boundary_probability);
    if below {
        let ceiling = min - 1;
        if near {
            ceiling
        } else {
            rng.random_range(config.population_min_age.min(ceiling)..=ceiling)
        }
    } else {
        let floor = max + 1;
        if near {
            floor
        } else {
            let ceiling = config.population_max_age.max(floor).min(MAX_GENERATED_AGE);
            rng.random_range(floor..=ceiling)
        }
    }
}

fn sample_conditions(
    rng: &mut StdRng,
    vocabulary: &Vocabulary,
    criteria: &Criteria,
    intent: Intent,
) -> ConditionSet {
    let required = criteria.required_conditions();
    let excluded = criteria.excluded_conditions();
    let mut conditions = required.clone();

    let extras = vocabulary.excluding(&[required, excluded]);
    if rng.random_bool(0.5)
        && let Some(extra) = extras.choose(rng)
    {
        conditions.insert(extra.clone());
    }

    match intent {
        Intent::Violate(ViolationKind::MissingRequired) => {
            let victims: Vec<&ConditionName> = required.iter().collect();
            if let Some(victim) = victims.choose(rng) {
                conditions.remove(*victim);
            }
        }
        Intent::Violate(ViolationKind::ExcludedPresent) => {
            let candidates: Vec<&ConditionName> = excluded
                .iter()
                .filter(|name| !required.contains(*name))
                .collect();
            if let Some(added) = candidates.choose(rng) {
                conditions.insert((*added).clone());
            }
        }
        _ => {}
    }
    conditions
}

fn sample_negated(
    rng: &mut StdRng,
    vocabulary: &Vocabulary,
    criteria: &Criteria,
    conditions: &ConditionSet,
) -> ConditionSet {
    let candidates = vocabulary.excluding(&[conditions, criteria.required_conditions()]);
    let wanted = rng.random_range(0..=2usize).min(candidates.len());
    candidates.choose_multiple(rng, wanted).cloned().collect()
}

fn narrative(
    rng: &mut StdRng,
    config: &GeneratorConfig,
    age: u32,
    gender: Gender,
    conditions: &ConditionSet,
    negated: &ConditionSet,
) -> String {
    let template = TEMPLATES[rng.random_range(0..TEMPLATES.len())];
    let described = if conditions.is_empty() {
        "no significant conditions".to_string()
    } else {
        conditions
            .iter()
            .map(ConditionName::as_str)
            .collect::<Vec<_>>()
            .join(" and ")
    };
    let mut text = template
        .replace("{age}", &age.to_string())
        .replace("{gender}", gender.noun())
        .replace("{conds}", &described);

    if !negated.is_empty() {
        let denied = negated
            .iter()
            .map(ConditionName::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        text.push_str(&format!(" No history of {denied}."));
    }

    if rng.random_bool(config.name_probability) {
        let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        text = format!("{first} {last}. {text}");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctm_model::condition_set;

    fn trial(min: u32, max: u32, required: &[&str], excluded: &[&str]) -> Trial {
        let criteria = Criteria::new(
            min,
            max,
            condition_set(required.iter().copied()),
            condition_set(excluded.iter().copied()),
        )
        .unwrap();
        Trial::new(TrialId::new("TX").unwrap(), "test trial", criteria)
    }

    #[test]
    fn eligible_slots_alternate_at_one_half() {
        let slots: Vec<bool> = (0..6).map(|i| is_eligible_slot(i, 0.5)).collect();
        assert_eq!(slots, vec![false, true, false, true, false, true]);
    }

    #[test]
    fn eligible_slots_respect_extremes() {
        assert!((0..20).all(|i| !is_eligible_slot(i, 0.0)));
        assert!((0..20).all(|i| is_eligible_slot(i, 1.0)));
    }

    #[test]
    fn infeasible_violations_fall_through() {
        let open = trial(0, MAX_GENERATED_AGE, &[], &[]);
        assert_eq!(plan_intent(0, 0.0, open.criteria()), Intent::Eligible);

        let only_age = trial(18, 65, &[], &[]);
        for index in 0..9 {
            assert_eq!(
                plan_intent(index, 0.0, only_age.criteria()),
                Intent::Violate(ViolationKind::AgeOutOfRange)
            );
        }
    }

    #[test]
    fn violations_cycle_within_a_trial() {
        let full = trial(18, 65, &["asthma"], &["cancer"]);
        let intents: Vec<Intent> = (0..6)
            .map(|slot| plan_intent(slot, 0.5, full.criteria()))
            .collect();
        assert_eq!(
            intents,
            vec![
                Intent::Violate(ViolationKind::AgeOutOfRange),
                Intent::Eligible,
                Intent::Violate(ViolationKind::MissingRequired),
                Intent::Eligible,
                Intent::Violate(ViolationKind::ExcludedPresent),
                Intent::Eligible,
            ]
        );
    }

    #[test]
    fn unit_seeds_differ_per_index() {
        assert_ne!(unit_seed(7, 0), unit_seed(7, 1));
        assert_eq!(unit_seed(7, 3), unit_seed(7, 3));
    }

    #[test]
    fn out_of_range_age_from_zero_minimum_goes_above() {
        let config = GeneratorConfig::default();
        let young = trial(0, 40, &[], &[]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(out_of_range_age(&mut rng, young.criteria(), &config) > 40);
        }
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let config = GeneratorConfig::default().with_eligible_fraction(1.5);
        assert!(matches!(
            config.validate(),
            Err(GenerateError::InvalidConfig {
                field: "eligible_fraction",
                ..
            })
        ));
    }
}
