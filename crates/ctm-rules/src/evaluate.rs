//! Rule evaluation over structured patient and trial attributes.
//!
//! Three rules decide eligibility:
//! - age: `min_age <= age <= max_age`, both bounds inclusive
//! - required: every required condition is among the patient's conditions
//! - excluded: no excluded condition is among the patient's conditions
//!
//! The label is eligible iff all three pass. The structured [`Explanation`]
//! renders as the canonical ground-truth reason shown to users.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use ctm_model::{ConditionSet, Label, Patient, Trial, join_conditions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Age,
    RequiredConditions,
    ExcludedConditions,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Age => "age",
            RuleKind::RequiredConditions => "required conditions",
            RuleKind::ExcludedConditions => "excluded conditions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeStatus {
    InRange,
    BelowMinimum,
    AboveMaximum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeOutcome {
    pub age: u32,
    pub min_age: u32,
    pub max_age: u32,
    pub status: AgeStatus,
}

impl AgeOutcome {
    pub fn passed(&self) -> bool {
        self.status == AgeStatus::InRange
    }

    fn detail(&self) -> String {
        match self.status {
            AgeStatus::InRange => format!(
                "Age {} is within range [{}-{}]",
                self.age, self.min_age, self.max_age
            ),
            AgeStatus::BelowMinimum => format!(
                "Patient age ({}) is below the minimum required age ({})",
                self.age, self.min_age
            ),
            AgeStatus::AboveMaximum => format!(
                "Patient age ({}) exceeds the maximum allowed age ({})",
                self.age, self.max_age
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredOutcome {
    pub present: ConditionSet,
    pub missing: ConditionSet,
}

impl RequiredOutcome {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    fn detail(&self) -> String {
        if !self.missing.is_empty() {
            format!(
                "Missing required condition(s): {}",
                join_conditions(&self.missing)
            )
        } else if self.present.is_empty() {
            "No specific conditions required".to_string()
        } else {
            format!(
                "Has required condition(s): {}",
                join_conditions(&self.present)
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedOutcome {
    pub checked: ConditionSet,
    pub present: ConditionSet,
}

impl ExcludedOutcome {
    pub fn passed(&self) -> bool {
        self.present.is_empty()
    }

    fn detail(&self) -> String {
        if !self.present.is_empty() {
            format!(
                "Has excluded condition(s): {}",
                join_conditions(&self.present)
            )
        } else if self.checked.is_empty() {
            "No exclusions apply".to_string()
        } else {
            format!(
                "None of the excluded conditions ({}) are present",
                join_conditions(&self.checked)
            )
        }
    }
}

/// One rule's verdict, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleLine {
    pub rule: RuleKind,
    pub passed: bool,
    pub detail: String,
}

/// Per-rule breakdown behind a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub age: AgeOutcome,
    pub required: RequiredOutcome,
    pub excluded: ExcludedOutcome,
}

impl Explanation {
    pub fn eligible(&self) -> bool {
        self.age.passed() && self.required.passed() && self.excluded.passed()
    }

    pub fn failed_rules(&self) -> Vec<RuleKind> {
        self.lines()
            .into_iter()
            .filter(|line| !line.passed)
            .map(|line| line.rule)
            .collect()
    }

    pub fn lines(&self) -> Vec<RuleLine> {
        vec![
            RuleLine {
                rule: RuleKind::Age,
                passed: self.age.passed(),
                detail: self.age.detail(),
            },
            RuleLine {
                rule: RuleKind::RequiredConditions,
                passed: self.required.passed(),
                detail: self.required.detail(),
            },
            RuleLine {
                rule: RuleKind::ExcludedConditions,
                passed: self.excluded.passed(),
                detail: self.excluded.detail(),
            },
        ]
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines();
        if self.eligible() {
            let parts: Vec<String> = lines
                .iter()
                .enumerate()
                .map(|(index, line)| {
                    if index == 0 {
                        line.detail.clone()
                    } else {
                        lower_first(&line.detail)
                    }
                })
                .collect();
            return write!(f, "{}.", parts.join("; "));
        }
        let failed: Vec<&str> = lines
            .iter()
            .filter(|line| !line.passed)
            .map(|line| line.detail.as_str())
            .collect();
        write!(f, "{}.", failed.join("; "))
    }
}

/// Label plus the explanation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub label: Label,
    pub explanation: Explanation,
}

impl Evaluation {
    /// Canonical reason string.
    pub fn reason(&self) -> String {
        self.explanation.to_string()
    }

    /// Required conditions the patient has.
    pub fn matched_terms(&self) -> Vec<String> {
        self.explanation
            .required
            .present
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Required conditions the patient lacks plus excluded conditions the patient has.
    pub fn violated_terms(&self) -> Vec<String> {
        let violated: BTreeSet<_> = self
            .explanation
            .required
            .missing
            .iter()
            .chain(&self.explanation.excluded.present)
            .collect();
        violated.into_iter().map(ToString::to_string).collect()
    }
}

/// Evaluate a patient against a trial's criteria. Pure and deterministic.
pub fn evaluate(patient: &Patient, trial: &Trial) -> Evaluation {
    let criteria = trial.criteria();
    let conditions = patient.conditions();
    let age = patient.age();

    let status = if age < criteria.min_age() {
        AgeStatus::BelowMinimum
    } else if age > criteria.max_age() {
        AgeStatus::AboveMaximum
    } else {
        AgeStatus::InRange
    };

    let (present, missing): (ConditionSet, ConditionSet) = criteria
        .required_conditions()
        .iter()
        .cloned()
        .partition(|condition| conditions.contains(condition));

    let excluded_present: ConditionSet = criteria
        .excluded_conditions()
        .intersection(conditions)
        .cloned()
        .collect();

    let explanation = Explanation {
        age: AgeOutcome {
            age,
            min_age: criteria.min_age(),
            max_age: criteria.max_age(),
            status,
        },
        required: RequiredOutcome { present, missing },
        excluded: ExcludedOutcome {
            checked: criteria.excluded_conditions().clone(),
            present: excluded_present,
        },
    };

    Evaluation {
        label: Label::from_bool(explanation.eligible()),
        explanation,
    }
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
