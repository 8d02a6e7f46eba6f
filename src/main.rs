use clap::Parser;
use crypto_collector::cli::{Cli, Commands};
use crypto_collector::config::{Config, Secrets};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", cli.config, e))?
    } else {
        eprintln!("Warning: config file {} not found", cli.config);
        eprintln!("Using default configuration");
        Config::default()
    };
    let secrets = Secrets::load(&cli.env_file)?;

    // Initialize telemetry
    crypto_collector::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting collection loop");
            args.execute(&config, &secrets).await?;
        }
        Commands::Collect(args) => {
            args.execute(&config, &secrets).await?;
        }
        Commands::Check(args) => {
            args.execute(&config, &secrets).await?;
        }
        Commands::Status(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("# Effective configuration ({})", cli.config);
            println!("{}", toml::to_string_pretty(&config)?);
            println!(
                "# GITHUB_TOKEN: {}",
                if secrets.github_token.is_some() { "set" } else { "missing" }
            );
        }
    }

    Ok(())
}
