//! Writing records and summaries as pretty-printed JSON, one file per record.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use ctm_model::{Patient, PatientRecord, Trial, TrialRecord};
use ctm_rules::{LabelSummary, Pair};
use ctm_synth::GenerationSummary;

use crate::discovery::record_file_name;
use crate::error::{IngestError, Result};

pub const GENERATION_SUMMARY_FILE: &str = "generation_summary.json";
pub const LABEL_SUMMARY_FILE: &str = "regenerate_summary.json";

/// Returns the number of files written.
pub fn write_patients(dir: &Path, patients: &[Patient]) -> Result<usize> {
    write_records(
        dir,
        "patient",
        patients
            .iter()
            .map(|patient| (patient.id().as_str(), PatientRecord::from(patient))),
    )
}

pub fn write_trials(dir: &Path, trials: &[Trial]) -> Result<usize> {
    write_records(
        dir,
        "trial",
        trials
            .iter()
            .map(|trial| (trial.id().as_str(), TrialRecord::from(trial))),
    )
}

pub fn write_pairs(dir: &Path, pairs: &[Pair]) -> Result<usize> {
    write_records(
        dir,
        "pair",
        pairs.iter().map(|pair| (pair.pair_id(), pair.to_record())),
    )
}

pub fn write_generation_summary(dir: &Path, summary: &GenerationSummary) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(GENERATION_SUMMARY_FILE);
    write_json(&path, summary)?;
    Ok(path)
}

pub fn write_label_summary(dir: &Path, summary: &LabelSummary) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(LABEL_SUMMARY_FILE);
    write_json(&path, summary)?;
    Ok(path)
}

fn write_records<'a, R, I>(dir: &Path, kind: &'static str, records: I) -> Result<usize>
where
    R: Serialize,
    I: IntoIterator<Item = (&'a str, R)>,
{
    ensure_dir(dir)?;
    let mut written = 0;
    for (id, record) in records {
        let path = dir.join(record_file_name(id));
        write_json(&path, &record)?;
        debug!(kind, id, "record written");
        written += 1;
    }
    info!(kind, dir = %dir.display(), written, "records written");
    Ok(written)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| IngestError::Io {
        operation: "create directory",
        path: dir.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| IngestError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');
    fs::write(path, json).map_err(|source| IngestError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })
}
