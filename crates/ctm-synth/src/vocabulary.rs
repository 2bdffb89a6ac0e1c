//! Controlled condition vocabulary and narrative fragments.

use ctm_model::{ConditionName, ConditionSet, Trial};

pub const CHRONIC_CONDITIONS: &[&str] = &[
    "type 2 diabetes",
    "hypertension",
    "cardiovascular disease",
    "cancer",
    "chronic kidney disease",
    "COPD",
    "asthma",
    "obesity",
    "hyperlipidemia",
    "arthritis",
    "osteoporosis",
    "epilepsy",
    "multiple sclerosis",
    "Parkinson's disease",
    "Alzheimer's disease",
    "HIV/AIDS",
    "liver disease",
    "thyroid disorders",
    "autoimmune diseases",
    "PCOS",
    "osteoarthritis",
    "heart disease",
];

pub const MENTAL_HEALTH: &[&str] = &[
    "depression",
    "anxiety",
    "bipolar disorder",
    "schizophrenia",
    "ADHD",
    "autism spectrum disorder",
];

pub const SYMPTOMS_ACUTE: &[&str] = &[
    "fatigue",
    "dizziness",
    "nausea",
    "vomiting",
    "diarrhea",
    "constipation",
    "chronic back pain",
    "migraine",
    "vitamin D deficiency",
];

pub const INFECTIOUS: &[&str] = &[
    "tuberculosis",
    "hepatitis B",
    "hepatitis C",
    "pneumonia",
    "bronchitis",
    "sinus infections",
];

pub(crate) const FIRST_NAMES: &[&str] = &[
    "John", "Maria", "Ahmed", "Chen", "Fatima", "Olga", "Samuel", "Priya", "Lucas", "Grace",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "Doe", "Lopez", "Khan", "Wong", "Okafor", "Ivanova", "Miller", "Sharma", "Silva", "Kim",
];

pub(crate) const TEMPLATES: &[&str] = &[
    "Patient is a {age}-year-old {gender} with {conds}.",
    "A {age}-year-old {gender} diagnosed with {conds}.",
    "{age}-year-old {gender} patient with a history of {conds}.",
];

/// Fixed, ordered list of condition names a generator may draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    conditions: Vec<ConditionName>,
}

impl Vocabulary {
    /// Built-in lists plus every condition the given trials mention.
    pub fn for_trials(trials: &[Trial]) -> Self {
        let mut set: ConditionSet = [CHRONIC_CONDITIONS, MENTAL_HEALTH, SYMPTOMS_ACUTE, INFECTIOUS]
            .into_iter()
            .flatten()
            .filter_map(|name| ConditionName::new(name))
            .collect();
        for trial in trials {
            let criteria = trial.criteria();
            set.extend(criteria.required_conditions().iter().cloned());
            set.extend(criteria.excluded_conditions().iter().cloned());
        }
        Self {
            conditions: set.into_iter().collect(),
        }
    }

    pub fn conditions(&self) -> &[ConditionName] {
        &self.conditions
    }

    /// Conditions not present in any of the given sets.
    pub fn excluding(&self, sets: &[&ConditionSet]) -> Vec<ConditionName> {
        self.conditions
            .iter()
            .filter(|name| !sets.iter().any(|set| set.contains(*name)))
            .cloned()
            .collect()
    }
}
