use super::{ConfigError, LoggingConfig, SweepConfig, WorkerFailurePolicy};
use crate::validators::parse_nameserver;
use crate::QueryType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sweep: SweepConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line; each one wins over the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub workers: Option<usize>,
    pub query_type: Option<QueryType>,
    pub timeout_secs: Option<u64>,
    pub no_recursion: bool,
    pub nameserver: Option<String>,
    pub verbose: bool,
    pub debug: bool,
    pub worker_failure: Option<WorkerFailurePolicy>,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Config::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(workers) = overrides.workers {
            self.sweep.workers = workers;
        }
        if let Some(query_type) = overrides.query_type {
            self.sweep.query_type = query_type;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.sweep.timeout_secs = timeout_secs;
        }
        if overrides.no_recursion {
            self.sweep.recursion = false;
        }
        if let Some(nameserver) = overrides.nameserver {
            self.sweep.nameserver = Some(nameserver);
        }
        if let Some(policy) = overrides.worker_failure {
            self.sweep.worker_failure = policy;
        }
        if overrides.verbose || overrides.debug {
            self.sweep.verbose = true;
        }
        if overrides.debug {
            self.logging.level = "debug".to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep.workers == 0 {
            return Err(ConfigError::Validation(
                "workers must be at least 1".to_string(),
            ));
        }

        if self.sweep.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.sweep.generator_buffer == 0 {
            return Err(ConfigError::Validation(
                "generator_buffer must be at least 1".to_string(),
            ));
        }

        if self.sweep.drain_poll_ms == 0 {
            return Err(ConfigError::Validation(
                "drain_poll_ms must be greater than 0".to_string(),
            ));
        }

        if self.sweep.hung_grace_ms == 0 {
            return Err(ConfigError::Validation(
                "hung_grace_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(ref ns) = self.sweep.nameserver {
            parse_nameserver(ns).map_err(ConfigError::Validation)?;
        }

        if !self.logging.is_valid_level() {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
