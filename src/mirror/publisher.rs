//! Mirror publisher
//!
//! Pushes the full serialized history to a fixed path on a remote store
//! using read-version-then-conditional-write. Publishing is best-effort:
//! the local history is the source of truth and the next cycle retries.

use super::{MirrorError, PublishOutcome, RemoteStore};
use chrono::Utc;

/// Publishes history bytes to one remote path
pub struct MirrorPublisher<R> {
    remote: R,
    path: String,
}

impl<R: RemoteStore> MirrorPublisher<R> {
    /// Create a publisher targeting `path` on `remote`
    pub fn new(remote: R, path: impl Into<String>) -> Self {
        Self {
            remote,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Run the two-branch protocol and report which branch ran
    pub async fn try_publish(&self, content: &[u8]) -> Result<PublishOutcome, MirrorError> {
        match self.remote.current_version(&self.path).await? {
            Some(version) => {
                let message = format!("Update {}", Utc::now().format("%Y-%m-%d %H:%M"));
                self.remote
                    .update(&self.path, content, &message, &version)
                    .await?;
                Ok(PublishOutcome::Updated {
                    locator: self.remote.locator(&self.path),
                })
            }
            None => {
                self.remote
                    .create(&self.path, content, "Initial commit")
                    .await?;
                Ok(PublishOutcome::Created {
                    locator: self.remote.locator(&self.path),
                })
            }
        }
    }

    /// Publish, logging any failure; `None` means the mirror was not updated this time
    pub async fn publish(&self, content: &[u8]) -> Option<String> {
        match self.try_publish(content).await {
            Ok(outcome) => {
                tracing::info!(
                    path = %self.path,
                    bytes = content.len(),
                    outcome = ?outcome,
                    "Mirror updated"
                );
                Some(outcome.locator().to_string())
            }
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "Mirror publish failed");
                None
            }
        }
    }
}
