//! Ingest errors.
//!
//! Only directory-level failures are errors. A single unreadable or
//! invalid record file is reported as a [`crate::SkippedFile`] instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    MissingDirectory { path: PathBuf },

    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
