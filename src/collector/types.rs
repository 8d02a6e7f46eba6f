//! Combined record types

use crate::source::Snapshot;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshots of one source keyed by instrument id
pub type SourceSnapshots = BTreeMap<String, Snapshot>;

/// One collection cycle's output
///
/// Serializes flat: `{"timestamp": ..., "binance": {...}, "bybit": {...}, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    /// Cycle start time, UTC, ISO-8601
    pub timestamp: String,
    /// Successful snapshots per source; failed fetches are simply missing
    #[serde(flatten)]
    pub by_source: BTreeMap<String, SourceSnapshots>,
}

impl CombinedRecord {
    /// Create an empty record stamped with the given time
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            by_source: BTreeMap::new(),
        }
    }

    /// Snapshot for a source/instrument pair, if collected
    pub fn get(&self, source: &str, instrument: &str) -> Option<&Snapshot> {
        self.by_source.get(source)?.get(instrument)
    }

    /// Total number of snapshots across all sources
    pub fn snapshot_count(&self) -> usize {
        self.by_source.values().map(BTreeMap::len).sum()
    }
}
