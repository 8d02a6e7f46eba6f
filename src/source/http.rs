//! Shared HTTP plumbing for the source adapters

use super::Absent;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build a client with a fixed per-request timeout
pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("crypto-collector/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    Ok(client)
}

/// Send a request and decode a JSON body, mapping every failure to an [`Absent`] reason
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Absent> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Absent::RateLimited);
    }
    if !status.is_success() {
        return Err(Absent::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| Absent::Malformed(e.to_string()))
}

fn transport_error(e: reqwest::Error) -> Absent {
    if e.is_timeout() {
        Absent::Timeout
    } else {
        Absent::Transport(e.to_string())
    }
}
