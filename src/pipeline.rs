//! Collection pipeline
//!
//! One cycle is collect → append → publish, run to completion before the
//! next one starts. Cycles are separated by a fixed sleep, so they never
//! overlap however slow a cycle is.

use crate::collector::{CombinedRecord, Collector};
use crate::mirror::{MirrorPublisher, RemoteStore};
use crate::store::HistoryStore;
use std::future::Future;
use std::time::Duration;

/// What happened during one cycle
#[derive(Debug)]
pub struct CycleReport {
    /// The record produced by the collector
    pub record: CombinedRecord,
    /// History length after the append, or the failure message
    pub appended: Result<usize, String>,
    /// Mirror locator when the publish succeeded
    pub mirror: Option<String>,
}

impl CycleReport {
    /// True when the record was durably stored
    pub fn is_persisted(&self) -> bool {
        self.appended.is_ok()
    }
}

/// Wires the collector, store and optional mirror together
pub struct Pipeline<R> {
    collector: Collector,
    store: HistoryStore,
    mirror: Option<MirrorPublisher<R>>,
}

impl<R: RemoteStore> Pipeline<R> {
    pub fn new(collector: Collector, store: HistoryStore, mirror: Option<MirrorPublisher<R>>) -> Self {
        Self {
            collector,
            store,
            mirror,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Run a single cycle
    ///
    /// The mirror is only touched after a successful append, and always
    /// receives the full persisted history rather than the new record.
    pub async fn run_cycle(&self) -> CycleReport {
        let record = self.collector.collect().await;

        let appended = match self.store.append(&record) {
            Ok(outcome) => {
                tracing::info!(
                    path = ?self.store.path(),
                    records = outcome.records,
                    recovered = outcome.recovered_from.is_some(),
                    "Record saved locally"
                );
                Ok(outcome.records)
            }
            Err(e) => {
                tracing::error!(path = ?self.store.path(), error = %e, "Failed to save record");
                Err(e.to_string())
            }
        };

        let mirror = match (&appended, &self.mirror) {
            (Ok(_), Some(publisher)) => match self.store.read_bytes() {
                Ok(bytes) => publisher.publish(&bytes).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read history for mirroring");
                    None
                }
            },
            _ => None,
        };

        CycleReport {
            record,
            appended,
            mirror,
        }
    }

    /// Run cycles until `shutdown` resolves or `max_cycles` have completed
    ///
    /// Returns the number of completed cycles. A cycle interrupted by
    /// `shutdown` is abandoned; the store's atomic commit means its record
    /// is either fully persisted or not at all.
    pub async fn run<F>(&self, interval: Duration, max_cycles: Option<u64>, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut completed = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(completed, "Shutdown requested during cycle");
                    break;
                }
                report = self.run_cycle() => {
                    completed += 1;
                    if !report.is_persisted() {
                        tracing::warn!(cycle = completed, "Cycle finished without saving");
                    } else if self.mirror.is_some() && report.mirror.is_none() {
                        tracing::warn!(cycle = completed, "Mirror not updated this cycle");
                    }
                }
            }

            if max_cycles.is_some_and(|max| completed >= max) {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(completed, "Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        completed
    }
}
