//! Run command implementation

use super::startup_check;
use crate::collector::Collector;
use crate::config::{Config, Secrets};
use crate::mirror::MirrorPublisher;
use crate::pipeline::Pipeline;
use crate::store::HistoryStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stop after this many cycles (default: run until interrupted)
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Keep history locally only
    #[arg(long)]
    pub no_mirror: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config, secrets: &Secrets) -> anyhow::Result<()> {
        let remote = if self.no_mirror {
            None
        } else {
            startup_check(config, secrets).await?
        };

        let collector = Collector::from_config(config, secrets)?;
        let store = HistoryStore::new(&config.store.path);
        let mirror = remote.map(|r| MirrorPublisher::new(r, config.mirror.path.clone()));
        let pipeline = Pipeline::new(collector, store, mirror);

        tracing::info!(
            symbols = ?config.collector.symbols,
            coin_ids = ?config.collector.coin_ids,
            interval_secs = config.collector.interval_secs,
            history = ?config.store.path,
            mirror = !self.no_mirror && config.mirror.enabled,
            "Starting collector"
        );

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Could not listen for interrupt");
                std::future::pending::<()>().await;
            }
        };

        let completed = pipeline
            .run(config.collector.interval(), self.cycles, shutdown)
            .await;

        tracing::info!(completed, "Collector stopped");
        Ok(())
    }
}
