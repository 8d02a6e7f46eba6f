//! Remote mirror
//!
//! Keeps a copy of the serialized history at a stable path in a remote,
//! version-controlled store.

mod github;
mod publisher;
mod types;

pub use github::{GithubConfig, GithubStore, GITHUB_API_URL, GITHUB_RAW_URL};
pub use publisher::MirrorPublisher;
pub use types::{MirrorError, PublishOutcome};

use async_trait::async_trait;

/// Trait for remote content stores with optimistic-concurrency writes
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Current version token of the object at `path`, `None` if it does not exist
    async fn current_version(&self, path: &str) -> Result<Option<String>, MirrorError>;
    /// Create the object; fails with [`MirrorError::Conflict`] if it already exists
    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<(), MirrorError>;
    /// Replace the object; the remote rejects a stale `version` with [`MirrorError::Conflict`]
    async fn update(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        version: &str,
    ) -> Result<(), MirrorError>;
    /// Public locator of the object at `path`
    fn locator(&self, path: &str) -> String;
}
