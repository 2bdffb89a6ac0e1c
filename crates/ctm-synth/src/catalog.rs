//! Built-in trial catalog used when no trial directory is supplied.

use ctm_model::{Criteria, Trial, TrialId, ValidationError, condition_set};

struct TrialSpec {
    id: &'static str,
    title: &'static str,
    text: &'static str,
    min_age: u32,
    max_age: u32,
    required: &'static [&'static str],
    excluded: &'static [&'static str],
}

const CATALOG: &[TrialSpec] = &[
    TrialSpec {
        id: "T001",
        title: "Glycemic control in adults with type 2 diabetes",
        text: "Inclusion: adults aged 18 to 65 with a diagnosis of type 2 diabetes. \
               Exclusion: cardiovascular disease or active cancer.",
        min_age: 18,
        max_age: 65,
        required: &["type 2 diabetes"],
        excluded: &["cardiovascular disease", "cancer"],
    },
    TrialSpec {
        id: "T002",
        title: "Blood pressure management in older adults",
        text: "Inclusion: participants aged 50 to 80 with hypertension. \
               Exclusion: chronic kidney disease or heart disease.",
        min_age: 50,
        max_age: 80,
        required: &["hypertension"],
        excluded: &["chronic kidney disease", "heart disease"],
    },
    TrialSpec {
        id: "T003",
        title: "Digital therapy for depression and anxiety",
        text: "Inclusion: adults aged 21 to 60 with depression. \
               Exclusion: bipolar disorder or schizophrenia.",
        min_age: 21,
        max_age: 60,
        required: &["depression"],
        excluded: &["bipolar disorder", "schizophrenia"],
    },
    TrialSpec {
        id: "T004",
        title: "Inhaled maintenance therapy for COPD",
        text: "Inclusion: patients aged 40 to 85 with COPD and a history of bronchitis. \
               Exclusion: asthma.",
        min_age: 40,
        max_age: 85,
        required: &["COPD", "bronchitis"],
        excluded: &["asthma"],
    },
    TrialSpec {
        id: "T005",
        title: "Lifestyle intervention for obesity",
        text: "Inclusion: adults aged 18 to 70 with obesity. \
               No exclusions beyond general safety screening.",
        min_age: 18,
        max_age: 70,
        required: &["obesity"],
        excluded: &[],
    },
];

/// The built-in trials, in id order.
pub fn builtin_trials() -> Result<Vec<Trial>, ValidationError> {
    CATALOG
        .iter()
        .map(|spec| {
            let criteria = Criteria::new(
                spec.min_age,
                spec.max_age,
                condition_set(spec.required.iter().copied()),
                condition_set(spec.excluded.iter().copied()),
            )?;
            Ok(Trial::new(TrialId::new(spec.id)?, spec.text, criteria).with_title(spec.title))
        })
        .collect()
}
