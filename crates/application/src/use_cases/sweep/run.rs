use crate::ports::{Resolver, ResultSink};
use crate::services::{Dispatcher, DispatcherOptions, KeyStream, WorkerPool, WorkerSpec};
use ferrous_sweep_domain::{DomainError, RunSummary, SweepConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Use case: resolve every key of a stream with a fixed pool of workers and
/// write the results to a sink.
pub struct RunSweepUseCase {
    resolver: Arc<dyn Resolver>,
    config: SweepConfig,
}

impl RunSweepUseCase {
    pub fn new(resolver: Arc<dyn Resolver>, config: SweepConfig) -> Self {
        Self { resolver, config }
    }

    pub async fn execute<S: ResultSink>(
        &self,
        keys: KeyStream,
        sink: S,
    ) -> Result<(RunSummary, S), DomainError> {
        let spec = WorkerSpec::new(
            Arc::clone(&self.resolver),
            self.config.query_type,
            Duration::from_secs(self.config.timeout_secs),
        );

        info!(
            workers = self.config.workers,
            query_type = %self.config.query_type,
            timeout_secs = self.config.timeout_secs,
            "Starting sweep"
        );

        let pool = WorkerPool::start(self.config.workers, spec);
        let options = DispatcherOptions::from_config(&self.config);

        Dispatcher::new(pool, keys, sink, options).run().await
    }
}
