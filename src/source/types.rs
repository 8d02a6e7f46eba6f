//! Source adapter types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single normalized reading from one source for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Last traded / current price
    pub price: f64,
    /// 24h volume (derivatives sources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Current or last funding rate (derivatives sources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<f64>,
    /// Market capitalisation (aggregator)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

impl Snapshot {
    /// Create a snapshot carrying only a price
    pub fn new(price: f64) -> Self {
        Self {
            price,
            volume: None,
            funding_rate: None,
            market_cap: None,
        }
    }

    pub fn with_volume(mut self, volume: Option<f64>) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_funding_rate(mut self, funding_rate: Option<f64>) -> Self {
        self.funding_rate = funding_rate;
        self
    }

    pub fn with_market_cap(mut self, market_cap: Option<f64>) -> Self {
        self.market_cap = market_cap;
        self
    }
}

/// Why an adapter produced no snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Absent {
    /// Request exceeded the adapter timeout
    #[error("request timed out")]
    Timeout,
    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),
    /// Upstream answered HTTP 429
    #[error("rate limited by upstream")]
    RateLimited,
    /// Any other non-2xx status
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// Upstream envelope reported an error
    #[error("upstream rejected request: {code} {message}")]
    Rejected { code: i64, message: String },
    /// Payload could not be decoded or lacked a required field
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Well-formed response with no entry for the instrument
    #[error("no data for instrument")]
    NoData,
}

impl Absent {
    /// Stable code used in structured logs
    pub fn code(&self) -> &'static str {
        match self {
            Absent::Timeout => "timeout",
            Absent::Transport(_) => "transport",
            Absent::RateLimited => "rate_limited",
            Absent::Status(_) => "http_status",
            Absent::Rejected { .. } => "rejected",
            Absent::Malformed(_) => "malformed",
            Absent::NoData => "no_data",
        }
    }
}

/// Outcome of a single adapter call
pub type FetchResult = Result<Snapshot, Absent>;

/// Parse a numeric field delivered as a string (exchange APIs quote numbers as strings)
pub(crate) fn parse_number(field: &str, raw: &str) -> Result<f64, Absent> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Absent::Malformed(format!("{field}: not a number: {raw:?}")))?;
    ensure_finite(field, value)
}

/// Like [`parse_number`], but an empty or missing value is `None`
pub(crate) fn parse_optional_number(field: &str, raw: Option<&str>) -> Result<Option<f64>, Absent> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_number(field, s).map(Some),
    }
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64, Absent> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Absent::Malformed(format!("{field}: non-finite value")))
    }
}
