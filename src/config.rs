//! # Configuration
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `TASKER_SEQUENCER__*` environment overrides.
//!
//! ```toml
//! environment = "production"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [orchestration]
//! description_prefix = "billing"
//!
//! [worker]
//! concurrency = 25
//! ```

use crate::constants::{defaults, CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR};
use crate::error::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub environment: String,
    pub logging: LoggingConfig,
    pub orchestration: OrchestrationConfig,
    pub worker: WorkerConfig,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            logging: LoggingConfig::default(),
            orchestration: OrchestrationConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tasker_sequencer=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Leading text of every step group's description
    pub description_prefix: String,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            description_prefix: defaults::DESCRIPTION_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum number of units an in-memory worker runs at once
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: defaults::WORKER_CONCURRENCY,
        }
    }
}

impl SequencerConfig {
    /// Load defaults plus environment overrides
    pub fn load() -> SequencerResult<Self> {
        Self::load_from(None)
    }

    /// Load defaults, the TOML file at `path` (when given) and environment overrides
    pub fn load_from(path: Option<&Path>) -> SequencerResult<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading sequencer configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                .prefix_separator(CONFIG_ENV_SEPARATOR)
                .separator(CONFIG_ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SequencerResult<()> {
        if self.environment.trim().is_empty() {
            return Err(SequencerError::Configuration(
                "environment cannot be empty".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(SequencerError::Configuration(
                "logging.level cannot be empty".to_string(),
            ));
        }
        if self.orchestration.description_prefix.trim().is_empty() {
            return Err(SequencerError::Configuration(
                "orchestration.description_prefix cannot be empty".to_string(),
            ));
        }
        if self.worker.concurrency == 0 {
            return Err(SequencerError::Configuration(
                "worker.concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Current environment from `TASKER_ENV` or `APP_ENV`
pub fn detect_environment() -> String {
    std::env::var("TASKER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| defaults::ENVIRONMENT.to_string())
}
