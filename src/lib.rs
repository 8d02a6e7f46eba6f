//! crypto-collector: periodic crypto market snapshots with a durable local history
//!
//! This library provides the core components for:
//! - Source adapters for Binance and Bybit perpetuals and CoinGecko
//! - A collector that merges one cycle's snapshots into a timestamped record
//! - A crash-safe append-only JSON history with corruption recovery
//! - Best-effort mirroring of the history to a GitHub repository
//! - The interval loop tying them together

pub mod cli;
pub mod collector;
pub mod config;
pub mod mirror;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod telemetry;
