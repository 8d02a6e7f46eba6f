//! Telemetry module
//!
//! Structured logging via `tracing`; components only use the facade and the
//! subscriber is chosen here at startup.

mod logging;

pub use logging::{init_logging, LogFormat};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format.into())
}
