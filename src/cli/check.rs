//! Startup check

use crate::config::{Config, Secrets};
use crate::mirror::GithubStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Skip the repository access check
    #[arg(long)]
    pub offline: bool,
}

impl CheckArgs {
    pub async fn execute(&self, config: &Config, secrets: &Secrets) -> anyhow::Result<()> {
        let mut config = config.clone();
        if self.offline {
            config.mirror.verify_on_startup = false;
        }

        match startup_check(&config, secrets).await? {
            Some(store) => println!(
                "Mirror OK: {} (branch {})",
                store.config().repository,
                store.config().branch
            ),
            None => println!("Mirror disabled"),
        }
        println!(
            "CoinGecko API key: {}",
            if secrets.coingecko_api_key.is_some() {
                "set"
            } else {
                "not set (public tier)"
            }
        );
        Ok(())
    }
}

/// Validate mirror secrets and access before entering the loop
///
/// Returns the mirror client when mirroring is enabled. A missing token is
/// fatal, as is an unreachable repository when `verify_on_startup` is set.
pub async fn startup_check(
    config: &Config,
    secrets: &Secrets,
) -> anyhow::Result<Option<GithubStore>> {
    if !config.mirror.enabled {
        tracing::info!("Mirror disabled in configuration");
        return Ok(None);
    }

    let token = secrets.require_github_token()?;
    let store = GithubStore::new(config.mirror.to_github_config(), token)?;

    if config.mirror.verify_on_startup {
        store.verify_access().await.map_err(|e| {
            anyhow::anyhow!(
                "GitHub repository {} is not accessible: {}",
                config.mirror.repository,
                e
            )
        })?;
        tracing::info!(repository = %config.mirror.repository, "Mirror access verified");
    }

    Ok(Some(store))
}
