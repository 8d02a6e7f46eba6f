//! Bybit v5 linear perpetuals adapter

use super::http::{build_client, get_json};
use super::types::{parse_number, parse_optional_number};
use super::{Absent, FetchResult, Snapshot, SourceAdapter};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Bybit REST base URL
pub const BYBIT_API_URL: &str = "https://api.bybit.com";

/// Configuration for the Bybit adapter
#[derive(Debug, Clone)]
pub struct BybitConfig {
    /// Base URL for the v5 REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Product category ("linear" for USDT perpetuals)
    pub category: String,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: BYBIT_API_URL.to_string(),
            timeout: Duration::from_secs(5),
            category: "linear".to_string(),
        }
    }
}

/// Source adapter for Bybit perpetual futures
pub struct BybitSource {
    config: BybitConfig,
    client: Client,
}

impl BybitSource {
    pub const NAME: &'static str = "bybit";

    /// Create an adapter with custom configuration
    pub fn with_config(config: BybitConfig) -> anyhow::Result<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SourceAdapter for BybitSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, symbol: &str) -> FetchResult {
        let url = format!("{}/v5/market/tickers", self.config.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("category", self.config.category.as_str()), ("symbol", symbol)]);

        let envelope: TickersEnvelope = get_json(request).await?;
        parse_envelope(envelope)
    }
}

/// v5 response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickersEnvelope {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<TickersResult>,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<TickerItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerItem {
    last_price: Option<String>,
    volume24h: Option<String>,
    funding_rate: Option<String>,
}

fn parse_envelope(envelope: TickersEnvelope) -> FetchResult {
    if envelope.ret_code != 0 {
        return Err(Absent::Rejected {
            code: envelope.ret_code,
            message: envelope.ret_msg,
        });
    }

    let item = envelope
        .result
        .and_then(|r| r.list.into_iter().next())
        .ok_or(Absent::NoData)?;

    let raw_price = item
        .last_price
        .ok_or_else(|| Absent::Malformed("missing lastPrice".to_string()))?;
    let price = parse_number("lastPrice", &raw_price)?;
    let volume = parse_optional_number("volume24h", item.volume24h.as_deref())?;
    let funding_rate = parse_optional_number("fundingRate", item.funding_rate.as_deref())?;

    Ok(Snapshot::new(price)
        .with_volume(volume)
        .with_funding_rate(funding_rate))
}
