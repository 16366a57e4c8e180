//! Ferrous Sweep Domain Layer
pub mod config;
pub mod errors;
pub mod ip_range;
pub mod lookup_key;
pub mod query_type;
pub mod result_record;
pub mod run_summary;
pub mod validators;

pub use config::{CliOverrides, Config, ConfigError, SweepConfig, WorkerFailurePolicy};
pub use errors::DomainError;
pub use ip_range::IpRange;
pub use lookup_key::LookupKey;
pub use query_type::QueryType;
pub use result_record::{Outcome, ResultRecord};
pub use run_summary::RunSummary;
