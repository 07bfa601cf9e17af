//! # Structured Logging Module
//!
//! Environment-aware structured logging for following orchestrations across
//! continuation boundaries.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging for the current environment
pub fn init_structured_logging(environment: &str, config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(resolve_log_level(environment, &config.level)));

        let layer = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .boxed(),
        };

        // Embedding applications may already own the global subscriber
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            format = ?config.format,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Configured level, raised to `debug` in test and development environments
fn resolve_log_level(environment: &str, configured: &str) -> String {
    match environment {
        "test" | "development" if configured == "info" => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Log structured data for orchestration operations
pub fn log_orchestration_operation(
    operation: &str,
    orchestration: &str,
    steps: Option<usize>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        orchestration = %orchestration,
        steps = steps,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 ORCHESTRATION_OPERATION"
    );
}

/// Log structured data for group operations
pub fn log_group_operation(
    operation: &str,
    orchestration: &str,
    group: &str,
    step_index: usize,
    units: usize,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        orchestration = %orchestration,
        group = %group,
        step_index = step_index,
        units = units,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "🔧 GROUP_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(resolve_log_level("test", "info"), "debug");
        assert_eq!(resolve_log_level("development", "info"), "debug");
        assert_eq!(resolve_log_level("development", "warn"), "warn");
        assert_eq!(resolve_log_level("production", "info"), "info");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_structured_logging("test", &config);
        init_structured_logging("test", &config);
    }
}
