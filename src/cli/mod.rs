//! CLI interface for crypto-collector
//!
//! Provides subcommands for:
//! - `run`: Collect, persist and mirror on a fixed interval
//! - `collect`: Fetch one combined record and print it
//! - `check`: Run the startup check only
//! - `status`: Summarize the local history file
//! - `config`: Show the effective configuration

mod check;
mod collect;
mod run;
mod status;

pub use check::{startup_check, CheckArgs};
pub use collect::CollectArgs;
pub use run::RunArgs;
pub use status::StatusArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crypto-collector")]
#[command(about = "Polls crypto market APIs into a durable JSON history mirrored to GitHub")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Dotenv file with secrets (GITHUB_TOKEN, COINGECKO_API_KEY)
    #[arg(long, default_value = "config/secrets.env")]
    pub env_file: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect, persist and mirror on a fixed interval
    Run(RunArgs),
    /// Fetch one combined record and print it without saving
    Collect(CollectArgs),
    /// Verify secrets and mirror access
    Check(CheckArgs),
    /// Summarize the local history file
    Status(StatusArgs),
    /// Show the effective configuration
    Config,
}
