//! Record file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::write::{GENERATION_SUMMARY_FILE, LABEL_SUMMARY_FILE};

/// Summary files that share a directory with pair records.
pub const SUMMARY_FILES: &[&str] = &[GENERATION_SUMMARY_FILE, LABEL_SUMMARY_FILE];

/// Standard layout of a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patients(&self) -> PathBuf {
        self.root.join("patients")
    }

    pub fn trials(&self) -> PathBuf {
        self.root.join("trials")
    }

    pub fn pairs(&self) -> PathBuf {
        self.root.join("pairs")
    }
}

/// Lists record files (`*.json`, excluding summaries) sorted by file name.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        operation: "read directory",
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| IngestError::Io {
                operation: "read directory",
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if !path.is_file() {
            continue;
        }
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let is_summary = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| SUMMARY_FILES.contains(&name));
        if is_json && !is_summary {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// File name for a record id, with path separators and other unsafe
/// characters replaced by `_`.
pub fn record_file_name(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.json")
}
