//! Durable store types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Durable store errors
///
/// Every variant means the on-disk history was left exactly as it was
/// before the failed call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// History file exists but is not a valid JSON array
    #[error("history file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    /// Corrupt history could not be moved aside
    #[error("failed to quarantine {path}: {source}")]
    Quarantine { path: PathBuf, source: io::Error },
    /// Read failure on a read-only path (read_bytes, summary)
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Temporary file could not be written
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    /// Atomic rename over the history file failed
    #[error("failed to replace {path}: {source}")]
    Replace { path: PathBuf, source: io::Error },
}

/// Result of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// History length after the append
    pub records: usize,
    /// Where a corrupt history was moved, if recovery happened
    pub recovered_from: Option<PathBuf>,
}

/// Read-only overview of the history file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub path: PathBuf,
    /// `None` when the file is missing
    pub size_bytes: Option<u64>,
    pub records: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    /// Quarantined copies sitting next to the history file
    pub backups: Vec<PathBuf>,
}
