//! Collect command implementation

use crate::collector::Collector;
use crate::config::{Config, Secrets};
use clap::Args;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

impl CollectArgs {
    pub async fn execute(&self, config: &Config, secrets: &Secrets) -> anyhow::Result<()> {
        let collector = Collector::from_config(config, secrets)?;
        let record = collector.collect().await;

        let json = if self.compact {
            serde_json::to_string(&record)?
        } else {
            serde_json::to_string_pretty(&record)?
        };
        println!("{}", json);
        Ok(())
    }
}
