//! Status command implementation

use crate::config::Config;
use crate::store::HistoryStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the last record as well
    #[arg(short, long)]
    pub verbose: bool,
}

impl StatusArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = HistoryStore::new(&config.store.path);
        let summary = store.summary()?;

        println!("crypto-collector status");
        println!("  History: {}", summary.path.display());
        match summary.size_bytes {
            Some(size) => println!("  Size: {} bytes", size),
            None => println!("  Size: (file not created yet)"),
        }
        println!("  Records: {}", summary.records);
        if let Some(first) = &summary.first_timestamp {
            println!("  First: {}", first);
        }
        if let Some(last) = &summary.last_timestamp {
            println!("  Last: {}", last);
        }
        for backup in &summary.backups {
            println!("  Backup: {}", backup.display());
        }

        if self.verbose {
            if let Some(last) = store.load()?.last() {
                println!("{}", serde_json::to_string_pretty(last)?);
            }
        }

        Ok(())
    }
}
