//! Mirror types

use thiserror::Error;

/// Remote mirror errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// Version token was stale, or the object appeared between read and create
    #[error("remote rejected write to {path}: version conflict")]
    Conflict { path: String },
    /// Connection, timeout, or protocol failure
    #[error("remote request failed: {0}")]
    Transport(String),
    /// Any other unexpected status
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body did not have the expected shape
    #[error("unexpected remote response: {0}")]
    Malformed(String),
}

/// Which branch of the publish protocol ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Object did not exist and was created
    Created { locator: String },
    /// Object existed and was updated against its current version
    Updated { locator: String },
}

impl PublishOutcome {
    pub fn locator(&self) -> &str {
        match self {
            PublishOutcome::Created { locator } | PublishOutcome::Updated { locator } => locator,
        }
    }
}
