//! Collector
//!
//! Walks the configured instruments through their source adapters, pacing
//! calls to respect upstream rate limits, and assembles one
//! [`CombinedRecord`] per cycle. A cycle never fails: absent results are
//! logged and left out of the record.

mod types;

pub use types::{CombinedRecord, SourceSnapshots};

use crate::config::{Config, Secrets};
use crate::source::{
    BinanceSource, BybitSource, CoinGeckoConfig, CoinGeckoSource, SourceAdapter,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// A family of sources sharing one instrument list and one pacing delay
pub struct SourceGroup {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    instruments: Vec<String>,
    delay: Duration,
}

impl SourceGroup {
    /// Create a group over the given instruments with a delay between calls
    pub fn new(instruments: Vec<String>, delay: Duration) -> Self {
        Self {
            adapters: Vec::new(),
            instruments,
            delay,
        }
    }

    /// Add an adapter; adapters are called in insertion order for each instrument
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Orchestrates all source groups into combined records
#[derive(Default)]
pub struct Collector {
    groups: Vec<SourceGroup>,
}

impl Collector {
    /// Create a collector with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source group; groups are visited in insertion order
    pub fn with_group(mut self, group: SourceGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Build the standard wiring: Binance + Bybit over derivatives symbols,
    /// CoinGecko over aggregator coin ids
    pub fn from_config(config: &Config, secrets: &Secrets) -> anyhow::Result<Self> {
        let collector_cfg = &config.collector;

        let binance = BinanceSource::with_config(config.sources.binance.to_adapter_config())?;
        let bybit = BybitSource::with_config(config.sources.bybit.to_adapter_config())?;
        let coingecko = CoinGeckoSource::with_config(CoinGeckoConfig {
            api_key: secrets.coingecko_api_key.clone(),
            ..config.sources.coingecko.to_adapter_config()
        })?;

        let derivatives = SourceGroup::new(
            collector_cfg.symbols.clone(),
            Duration::from_millis(collector_cfg.derivatives_delay_ms),
        )
        .with_adapter(Arc::new(binance))
        .with_adapter(Arc::new(bybit));

        let aggregators = SourceGroup::new(
            collector_cfg.coin_ids.clone(),
            Duration::from_millis(collector_cfg.aggregator_delay_ms),
        )
        .with_adapter(Arc::new(coingecko));

        Ok(Self::new().with_group(derivatives).with_group(aggregators))
    }

    /// Names of every registered source, in call order
    pub fn source_names(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.adapters.iter().map(|a| a.name()))
            .collect()
    }

    /// Run one collection cycle
    ///
    /// Always returns a record: every registered source has a (possibly
    /// empty) map, and the timestamp is taken at cycle start.
    pub async fn collect(&self) -> CombinedRecord {
        let mut record = CombinedRecord::new(Utc::now());
        for name in self.source_names() {
            record.by_source.entry(name.to_string()).or_default();
        }

        let mut absent = 0usize;
        for group in &self.groups {
            let mut first_call = true;
            for instrument in &group.instruments {
                for adapter in &group.adapters {
                    if !first_call && !group.delay.is_zero() {
                        tokio::time::sleep(group.delay).await;
                    }
                    first_call = false;

                    match adapter.fetch(instrument).await {
                        Ok(snapshot) => {
                            record
                                .by_source
                                .entry(adapter.name().to_string())
                                .or_default()
                                .insert(instrument.clone(), snapshot);
                        }
                        Err(reason) => {
                            absent += 1;
                            tracing::warn!(
                                source = adapter.name(),
                                instrument = %instrument,
                                reason = reason.code(),
                                detail = %reason,
                                "No data from source"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            timestamp = %record.timestamp,
            snapshots = record.snapshot_count(),
            absent,
            "Collection cycle complete"
        );

        record
    }
}
