use ferrous_sweep_application::ports::ResultSink;
use ferrous_sweep_application::use_cases::RunSweepUseCase;
use ferrous_sweep_domain::validators::parse_nameserver;
use ferrous_sweep_domain::Config;
use ferrous_sweep_infrastructure::dns::DnsResolver;
use ferrous_sweep_infrastructure::output::{FileSink, StdoutSink};
use ferrous_sweep_infrastructure::system::discover_nameserver;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct SweepServices {
    pub use_case: RunSweepUseCase,
}

impl SweepServices {
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let nameserver = match config.sweep.nameserver {
            Some(ref ns) => parse_nameserver(ns).map_err(anyhow::Error::msg)?,
            None => discover_nameserver(),
        };

        let resolver = Arc::new(DnsResolver::new(
            nameserver,
            config.sweep.recursion,
            Duration::from_secs(config.sweep.timeout_secs),
        ));

        info!(
            nameserver = %nameserver,
            workers = config.sweep.workers,
            "Resolver ready"
        );

        Ok(Self {
            use_case: RunSweepUseCase::new(resolver, config.sweep.clone()),
        })
    }
}

/// Results go to `output` when given, stdout otherwise.
pub fn open_sink(output: Option<&Path>) -> anyhow::Result<Box<dyn ResultSink>> {
    let sink: Box<dyn ResultSink> = match output {
        Some(path) => Box::new(FileSink::create(path)?),
        None => Box::new(StdoutSink::stdout()),
    };
    Ok(sink)
}
