pub mod config;
pub mod logging;
pub mod sources;

pub use config::load_config;
pub use logging::init_logging;
pub use sources::{load_sources, SourceArgs};
