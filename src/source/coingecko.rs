//! CoinGecko market-data adapter
//!
//! Uses the per-coin endpoint, which is heavily rate limited on the public
//! tier. A demo API key, if configured, is sent as `x-cg-demo-api-key`.

use super::http::{build_client, get_json};
use super::types::ensure_finite;
use super::{Absent, FetchResult, Snapshot, SourceAdapter};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinGecko REST base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com";

/// Header carrying the demo-tier API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Configuration for the CoinGecko adapter
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Quote currency for price and market cap
    pub vs_currency: String,
    /// Optional demo API key
    pub api_key: Option<String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            vs_currency: "usd".to_string(),
            api_key: None,
        }
    }
}

/// Source adapter for CoinGecko coin snapshots
pub struct CoinGeckoSource {
    config: CoinGeckoConfig,
    client: Client,
}

impl CoinGeckoSource {
    pub const NAME: &'static str = "coingecko";

    /// Create an adapter with custom configuration
    pub fn with_config(config: CoinGeckoConfig) -> anyhow::Result<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SourceAdapter for CoinGeckoSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, coin_id: &str) -> FetchResult {
        let url = format!("{}/api/v3/coins/{}", self.config.base_url, coin_id);
        let mut request = self.client.get(&url).query(&[
            ("localization", "false"),
            ("tickers", "false"),
            ("community_data", "false"),
            ("developer_data", "false"),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let coin: CoinResponse = get_json(request).await?;
        parse_coin(coin, &self.config.vs_currency)
    }
}

/// Coin detail response (fields we use)
#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
}

fn parse_coin(coin: CoinResponse, vs_currency: &str) -> FetchResult {
    let market_data = coin
        .market_data
        .ok_or_else(|| Absent::Malformed("missing market_data".to_string()))?;

    let price = market_data
        .current_price
        .get(vs_currency)
        .copied()
        .flatten()
        .ok_or_else(|| Absent::Malformed(format!("missing current_price.{vs_currency}")))?;
    let price = ensure_finite("current_price", price)?;

    let market_cap = market_data
        .market_cap
        .get(vs_currency)
        .copied()
        .flatten()
        .map(|cap| ensure_finite("market_cap", cap))
        .transpose()?;

    Ok(Snapshot::new(price).with_market_cap(market_cap))
}
