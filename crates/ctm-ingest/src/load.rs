//! Loading record directories into validated model values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use ctm_model::{PairRecord, Patient, PatientRecord, Trial, TrialRecord};
use ctm_rules::Pair;

use crate::discovery::list_json_files;
use crate::error::{IngestError, Result};

/// A record file that was not loaded, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedFile>,
}

impl<T> Loaded<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, path: PathBuf, reason: String) {
        warn!(path = %path.display(), %reason, "skipping record file");
        self.skipped.push(SkippedFile { path, reason });
    }
}

/// A stored pair that failed re-verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairMismatch {
    pub pair_id: String,
    pub reason: String,
}

pub fn load_patients(dir: &Path) -> Result<Loaded<Patient>> {
    load_records(dir, "patient", |record: PatientRecord| {
        Patient::try_from(record).map_err(|err| err.to_string())
    })
}

pub fn load_trials(dir: &Path) -> Result<Loaded<Trial>> {
    load_records(dir, "trial", |record: TrialRecord| {
        Trial::try_from(record).map_err(|err| err.to_string())
    })
}

/// Raw pair records, parsed but not yet checked against the rules.
pub fn load_pair_records(dir: &Path) -> Result<Loaded<PairRecord>> {
    load_records(dir, "pair", Ok)
}

/// Load pairs, keeping only those whose stored label the rules reproduce.
pub fn load_pairs(dir: &Path, patients: &[Patient], trials: &[Trial]) -> Result<Loaded<Pair>> {
    let index = Index::new(patients, trials);
    load_records(dir, "pair", |record: PairRecord| index.resolve(record))
}

/// Re-derive every stored label and report the records that disagree.
pub fn verify_pairs(
    records: &[PairRecord],
    patients: &[Patient],
    trials: &[Trial],
) -> Vec<PairMismatch> {
    let index = Index::new(patients, trials);
    let mismatches: Vec<PairMismatch> = records
        .iter()
        .filter_map(|record| {
            index
                .resolve(record.clone())
                .err()
                .map(|reason| PairMismatch {
                    pair_id: display_pair_id(record),
                    reason,
                })
        })
        .collect();
    info!(
        checked = records.len(),
        mismatches = mismatches.len(),
        "pair verification complete"
    );
    mismatches
}

fn display_pair_id(record: &PairRecord) -> String {
    match (&record.pair_id, &record.patient_id, &record.trial_id) {
        (Some(id), _, _) => id.clone(),
        (None, Some(patient), Some(trial)) => format!("{patient}_{trial}"),
        _ => "<unknown>".to_string(),
    }
}

struct Index<'a> {
    patients: HashMap<&'a str, &'a Patient>,
    trials: HashMap<&'a str, &'a Trial>,
}

impl<'a> Index<'a> {
    fn new(patients: &'a [Patient], trials: &'a [Trial]) -> Self {
        Self {
            patients: patients.iter().map(|p| (p.id().as_str(), p)).collect(),
            trials: trials.iter().map(|t| (t.id().as_str(), t)).collect(),
        }
    }

    fn resolve(&self, record: PairRecord) -> std::result::Result<Pair, String> {
        let patient_id = record.patient_id.as_deref().map(str::trim).unwrap_or_default();
        let trial_id = record.trial_id.as_deref().map(str::trim).unwrap_or_default();
        let patient = self.patients.get(patient_id).copied();
        let trial = self.trials.get(trial_id).copied();
        match (patient, trial) {
            (Some(patient), Some(trial)) => {
                Pair::from_record(record, patient, trial).map_err(|err| err.to_string())
            }
            (None, _) if record.patient_id.is_some() => Err(format!("unknown patient `{patient_id}`")),
            (_, None) if record.trial_id.is_some() => Err(format!("unknown trial `{trial_id}`")),
            _ => Err("pair record is missing patient_id or trial_id".to_string()),
        }
    }
}

fn load_records<R, T, F>(dir: &Path, kind: &'static str, mut convert: F) -> Result<Loaded<T>>
where
    R: DeserializeOwned,
    F: FnMut(R) -> std::result::Result<T, String>,
{
    let files = list_json_files(dir)?;
    let mut loaded = Loaded::new();
    for path in files {
        let contents = fs::read_to_string(&path).map_err(|source| IngestError::Io {
            operation: "read",
            path: path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            debug!(path = %path.display(), "skipping empty file");
            continue;
        }
        let record: R = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(err) => {
                loaded.skip(path, format!("invalid JSON: {err}"));
                continue;
            }
        };
        match convert(record) {
            Ok(item) => loaded.items.push(item),
            Err(reason) => loaded.skip(path, reason),
        }
    }
    info!(
        kind,
        dir = %dir.display(),
        loaded = loaded.items.len(),
        skipped = loaded.skipped.len(),
        "records loaded"
    );
    Ok(loaded)
}
