//! Patient, trial, and pair record directories.
//!
//! A data directory holds `patients/`, `trials/`, and `pairs/`, each with one
//! JSON record per file named after the record id. Loading is lenient per
//! file and strict per directory.

pub mod discovery;
pub mod error;
pub mod load;
pub mod write;

pub use discovery::{DataDir, SUMMARY_FILES, list_json_files, record_file_name};
pub use error::{IngestError, Result};
pub use load::{
    Loaded, PairMismatch, SkippedFile, load_pair_records, load_pairs, load_patients,
    load_trials, verify_pairs,
};
pub use write::{
    GENERATION_SUMMARY_FILE, LABEL_SUMMARY_FILE, write_generation_summary, write_label_summary,
    write_pairs, write_patients, write_trials,
};
