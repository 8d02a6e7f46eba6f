//! GitHub contents API client
//!
//! Files are addressed by repository path on a branch; every write must
//! carry the blob `sha` of the version it replaces, which gives us the
//! optimistic-concurrency token the publisher relies on.

use super::{MirrorError, RemoteStore};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Base URL for raw file downloads
pub const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Configuration for the GitHub client
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Repository as "owner/name"
    pub repository: String,
    /// Branch that receives the commits
    pub branch: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            repository: String::new(),
            branch: "main".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Remote store backed by a file in a GitHub repository
pub struct GithubStore {
    config: GithubConfig,
    client: Client,
}

impl std::fmt::Debug for GithubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GithubStore {
    /// Create a client authenticated with the given token
    pub fn new(config: GithubConfig, token: &str) -> anyhow::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| anyhow::anyhow!("GitHub token contains invalid header characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("crypto-collector/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Check that the token can see the repository
    pub async fn verify_access(&self) -> Result<(), MirrorError> {
        let url = format!(
            "{}/repos/{}",
            self.config.api_url, self.config.repository
        );
        let response = self.client.get(&url).send().await.map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_url,
            self.config.repository,
            path.trim_start_matches('/')
        )
    }

    async fn put_contents(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), MirrorError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(content),
            "branch": self.config.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let response = self
            .client
            .put(self.contents_url(path))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        // a create that loses the race is rejected with 422 for the missing sha;
        // on update, 422 is a validation failure and keeps its body
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(MirrorError::Conflict {
                path: path.to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY if sha.is_none() => Err(MirrorError::Conflict {
                path: path.to_string(),
            }),
            _ => Err(status_error(response).await),
        }
    }
}

#[async_trait]
impl RemoteStore for GithubStore {
    async fn current_version(&self, path: &str) -> Result<Option<String>, MirrorError> {
        let response = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body = response.text().await.map_err(transport)?;
                let file: ContentsFile = serde_json::from_str(&body)
                    .map_err(|e| MirrorError::Malformed(format!("contents of {path}: {e}")))?;
                Ok(Some(file.sha))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<(), MirrorError> {
        self.put_contents(path, content, message, None).await
    }

    async fn update(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        version: &str,
    ) -> Result<(), MirrorError> {
        self.put_contents(path, content, message, Some(version))
            .await
    }

    fn locator(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            GITHUB_RAW_URL,
            self.config.repository,
            self.config.branch,
            path.trim_start_matches('/')
        )
    }
}

/// File entry from the contents API (fields we use)
#[derive(Debug, Deserialize)]
struct ContentsFile {
    sha: String,
}

fn transport(e: reqwest::Error) -> MirrorError {
    MirrorError::Transport(e.to_string())
}

async fn status_error(response: Response) -> MirrorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    MirrorError::Status { status, body }
}
