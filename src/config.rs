//! Configuration types for crypto-collector
//!
//! Non-secret settings come from a TOML file; secrets come from the
//! environment (optionally pre-loaded from a dotenv file). Both are loaded
//! once at startup and passed into component constructors.

use crate::mirror::GithubConfig;
use crate::source::{BinanceConfig, BybitConfig, CoinGeckoConfig};
use crate::source::{BINANCE_API_URL, BYBIT_API_URL, COINGECKO_API_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the mirror access token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable holding the optional CoinGecko demo key
pub const COINGECKO_API_KEY_VAR: &str = "COINGECKO_API_KEY";

/// Configuration errors surfaced by the startup check
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required secret is not set
    #[error("missing required environment variable: {0}")]
    MissingSecret(&'static str),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub sources: SourcesConfig,
    pub store: StoreConfig,
    pub mirror: MirrorConfig,
    pub telemetry: TelemetryConfig,
}

/// Instruments and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Derivatives symbols (Binance / Bybit)
    pub symbols: Vec<String>,
    /// Aggregator coin identifiers (CoinGecko)
    pub coin_ids: Vec<String>,
    /// Sleep between cycles
    pub interval_secs: u64,
    /// Pause between derivatives calls
    pub derivatives_delay_ms: u64,
    /// Pause between aggregator calls
    pub aggregator_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string(), "SOLUSDT".to_string()],
            coin_ids: vec!["bitcoin".to_string(), "solana".to_string()],
            interval_secs: 60,
            derivatives_delay_ms: 500,
            aggregator_delay_ms: 1500,
        }
    }
}

impl CollectorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Per-source endpoint settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub binance: BinanceSettings,
    pub bybit: BybitSettings,
    pub coingecko: CoinGeckoSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

impl BinanceSettings {
    pub fn to_adapter_config(&self) -> BinanceConfig {
        BinanceConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BybitSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub category: String,
}

impl Default for BybitSettings {
    fn default() -> Self {
        Self {
            base_url: BYBIT_API_URL.to_string(),
            timeout_secs: 5,
            category: "linear".to_string(),
        }
    }
}

impl BybitSettings {
    pub fn to_adapter_config(&self) -> BybitConfig {
        BybitConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            category: self.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinGeckoSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub vs_currency: String,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            timeout_secs: 15,
            vs_currency: "usd".to_string(),
        }
    }
}

impl CoinGeckoSettings {
    /// Adapter config without an API key; the key is a secret and is added by the caller
    pub fn to_adapter_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            vs_currency: self.vs_currency.clone(),
            api_key: None,
        }
    }
}

/// History file location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/processed/combined.json"),
        }
    }
}

/// Remote mirror settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Publish after every successful append
    pub enabled: bool,
    /// GitHub REST API base URL
    pub api_url: String,
    /// Target repository as "owner/name"
    pub repository: String,
    /// Path of the mirrored file inside the repository
    pub path: String,
    /// Branch to commit to
    pub branch: String,
    pub timeout_secs: u64,
    /// Probe repository access before entering the loop
    pub verify_on_startup: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.github.com".to_string(),
            repository: "Alfabit7/datatest".to_string(),
            path: "combined.json".to_string(),
            branch: "main".to_string(),
            timeout_secs: 15,
            verify_on_startup: true,
        }
    }
}

impl MirrorConfig {
    pub fn to_github_config(&self) -> GithubConfig {
        GithubConfig {
            api_url: self.api_url.clone(),
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormatSetting,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormatSetting::Pretty,
        }
    }
}

/// Log output format as written in the config file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Secrets read from the environment
#[derive(Clone, Default)]
pub struct Secrets {
    pub github_token: Option<String>,
    pub coingecko_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field(
                "coingecko_api_key",
                &self.coingecko_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Secrets {
    /// Load a dotenv file if it exists, then read secrets from the environment
    ///
    /// Variables already present in the environment take precedence over the file.
    pub fn load(env_file: impl AsRef<Path>) -> anyhow::Result<Self> {
        let env_file = env_file.as_ref();
        if env_file.exists() {
            dotenvy::from_path(env_file)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", env_file.display(), e))?;
        }
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build secrets from an arbitrary lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            github_token: read(GITHUB_TOKEN_VAR),
            coingecko_api_key: read(COINGECKO_API_KEY_VAR),
        }
    }

    /// The mirror token, or the startup error when it is missing
    pub fn require_github_token(&self) -> Result<&str, ConfigError> {
        self.github_token
            .as_deref()
            .ok_or(ConfigError::MissingSecret(GITHUB_TOKEN_VAR))
    }
}
