//! Binance USDⓈ-M futures adapter
//!
//! Reads the 24h ticker for price and volume. The funding rate lives on a
//! separate endpoint and is fetched best-effort: if it fails the snapshot is
//! still returned, just without `funding_rate`.

use super::http::{build_client, get_json};
use super::types::{parse_number, parse_optional_number};
use super::{Absent, FetchResult, Snapshot, SourceAdapter};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Binance futures REST base URL
pub const BINANCE_API_URL: &str = "https://fapi.binance.com";

/// Configuration for the Binance adapter
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Base URL for the futures REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Source adapter for Binance perpetual futures
pub struct BinanceSource {
    config: BinanceConfig,
    client: Client,
}

impl BinanceSource {
    pub const NAME: &'static str = "binance";

    /// Create an adapter with custom configuration
    pub fn with_config(config: BinanceConfig) -> anyhow::Result<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<TickerResponse, Absent> {
        let url = format!("{}/fapi/v1/ticker/24hr", self.config.base_url);
        get_json(self.client.get(&url).query(&[("symbol", symbol)])).await
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Option<f64>, Absent> {
        let url = format!("{}/fapi/v1/premiumIndex", self.config.base_url);
        let index: PremiumIndexResponse =
            get_json(self.client.get(&url).query(&[("symbol", symbol)])).await?;
        parse_optional_number("lastFundingRate", index.last_funding_rate.as_deref())
    }
}

#[async_trait]
impl SourceAdapter for BinanceSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, symbol: &str) -> FetchResult {
        let ticker = self.fetch_ticker(symbol).await?;
        let snapshot = parse_ticker(ticker)?;

        let funding_rate = match self.fetch_funding_rate(symbol).await {
            Ok(rate) => rate,
            Err(reason) => {
                tracing::debug!(
                    source = Self::NAME,
                    instrument = symbol,
                    reason = %reason,
                    "Funding rate unavailable"
                );
                None
            }
        };

        Ok(snapshot.with_funding_rate(funding_rate))
    }
}

/// 24h ticker response (fields we use)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    last_price: Option<String>,
    volume: Option<String>,
}

/// Premium index response (fields we use)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndexResponse {
    last_funding_rate: Option<String>,
}

fn parse_ticker(ticker: TickerResponse) -> FetchResult {
    let raw_price = ticker
        .last_price
        .ok_or_else(|| Absent::Malformed("missing lastPrice".to_string()))?;
    let price = parse_number("lastPrice", &raw_price)?;
    let volume = parse_optional_number("volume", ticker.volume.as_deref())?;
    Ok(Snapshot::new(price).with_volume(volume))
}
