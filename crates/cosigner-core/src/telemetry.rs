//! # Telemetry
//!
//! Log configuration from environment variables and `tracing-subscriber`
//! setup. Library code only emits `tracing` events; installing a subscriber
//! is left to the binary or test harness embedding the engine.

use std::env;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Errors from subscriber installation.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("invalid log filter {filter:?}: {error}")]
    Filter {
        /// Directive as configured.
        filter: String,
        /// Parser message.
        error: String,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive (`info`, `cosigner_core=debug`, ...).
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LogConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `COSIGNER_LOG_LEVEL` or `RUST_LOG`: filter directive (default: info)
    /// - `COSIGNER_JSON_LOGS`: JSON output (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: lookup("COSIGNER_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
            json_logs: lookup("COSIGNER_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_new(&self.log_level).map_err(|e| TelemetryError::Filter {
            filter: self.log_level.clone(),
            error: e.to_string(),
        })
    }
}

/// Installs the global subscriber described by `config`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = config.filter()?;

    if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::debug!(level = %config.log_level, json = config.json_logs, "tracing initialized");
    Ok(())
}
