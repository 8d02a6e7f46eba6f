//! Source adapters
//!
//! Each adapter fetches one instrument's current snapshot from an upstream
//! HTTP API and normalizes it into a [`Snapshot`]. Every failure mode is
//! reported as an [`Absent`] reason; adapters never retry.

mod binance;
mod bybit;
mod coingecko;
mod http;
mod types;

pub use binance::{BinanceConfig, BinanceSource, BINANCE_API_URL};
pub use bybit::{BybitConfig, BybitSource, BYBIT_API_URL};
pub use coingecko::{CoinGeckoConfig, CoinGeckoSource, COINGECKO_API_URL};
pub use types::{Absent, FetchResult, Snapshot};

use async_trait::async_trait;

/// Trait for upstream source implementations
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name used as the key in combined records
    fn name(&self) -> &str;
    /// Fetch the current snapshot for one instrument
    async fn fetch(&self, instrument: &str) -> FetchResult;
}
