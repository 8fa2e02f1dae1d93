//! # Structured Logging Module
//!
//! Environment-aware structured logging for route syncs and the commands they
//! run. `RUST_LOG` takes precedence over the configured level, which takes
//! precedence over the environment default.

use crate::config::{ConfigManager, LogFormat, LoggingConfig};
use chrono::Utc;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with the environment defaults
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingConfig::default());
}

/// Initialize structured logging from configuration. Only the first call in
/// a process has any effect.
pub fn init_structured_logging_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| default_log_level(&environment).to_string());

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
            LogFormat::Json => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed(),
            LogFormat::Text => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
        };

        // A subscriber set by an embedding application wins
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::debug!(
            pid = process::id(),
            environment = %environment,
            level = %log_level,
            "Structured logging initialized"
        );
    });
}

/// Default log level for an environment
fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "test" => "debug",
        "development" => "info",
        "production" => "warn",
        _ => "info",
    }
}

/// Log structured data for a sync or reset of one network
pub fn log_route_operation(
    operation: &str,
    network_id: i64,
    network_name: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        network_id = network_id,
        network_name = network_name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "ROUTE_OPERATION"
    );
}
