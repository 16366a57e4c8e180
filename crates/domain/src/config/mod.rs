//! Configuration module for Ferrous Sweep
//!
//! - `root`: Main configuration and CLI overrides
//! - `sweep`: Worker pool, query and output settings
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod root;
pub mod sweep;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use sweep::{SweepConfig, WorkerFailurePolicy};
