use super::generator::KeyStream;
use super::pool::WorkerPool;
use crate::ports::ResultSink;
use ferrous_sweep_domain::{
    DomainError, LookupKey, Outcome, ResultRecord, RunSummary, SweepConfig, WorkerFailurePolicy,
};
use futures::future::{join_all, AbortHandle, Abortable, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Knobs of the dispatch loop that are not part of the worker itself.
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Emit NoResult and Timeout records as well as successes.
    pub verbose: bool,
    /// Period of the bounded readiness wait.
    pub poll_interval: Duration,
    /// A worker silent for this long on one key is treated as dead.
    pub hung_after: Duration,
    pub failure_policy: WorkerFailurePolicy,
}

impl DispatcherOptions {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            verbose: config.verbose,
            poll_interval: Duration::from_millis(config.drain_poll_ms),
            hung_after: Duration::from_secs(config.timeout_secs)
                + Duration::from_millis(config.hung_grace_ms),
            failure_policy: config.worker_failure,
        }
    }
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self::from_config(&SweepConfig::default())
    }
}

/// Counters of a run. Owned by the dispatcher alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolState {
    /// Keys sent to a worker and not answered yet; always within `0..=P`.
    pub outstanding: usize,
    /// Highest `outstanding` seen during the run.
    pub peak_outstanding: usize,
    pub dispatched: u64,
    pub completed: u64,
    pub succeeded: u64,
    pub no_result: u64,
    pub timed_out: u64,
    pub lost: u64,
}

/// A worker channel that became ready (or was given up on).
struct Readiness {
    id: usize,
    /// `None` when the wait was aborted and the receiver dropped.
    replies: Option<mpsc::Receiver<ResultRecord>>,
    /// `None` when the channel closed without a reply.
    reply: Option<ResultRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fed {
    Dispatched,
    Exhausted,
    Retired,
}

/// Single-threaded coordinator: keeps every worker busy from the key stream,
/// multiplexes over their reply channels, and drives the drain and teardown.
pub struct Dispatcher<S: ResultSink> {
    pool: WorkerPool,
    keys: KeyStream,
    /// Keys pulled from the stream that never reached a worker.
    pending: VecDeque<LookupKey>,
    sink: S,
    options: DispatcherOptions,
    state: PoolState,
    ready: FuturesUnordered<BoxFuture<'static, Readiness>>,
    last_overdue_check: Instant,
}

impl<S: ResultSink> Dispatcher<S> {
    pub fn new(pool: WorkerPool, keys: KeyStream, sink: S, options: DispatcherOptions) -> Self {
        Self {
            pool,
            keys,
            pending: VecDeque::new(),
            sink,
            options,
            state: PoolState::default(),
            ready: FuturesUnordered::new(),
            last_overdue_check: Instant::now(),
        }
    }

    /// Run the whole sweep: fill, steady state, drain, teardown, summary.
    ///
    /// Workers are always torn down, also when the run stops early.
    pub async fn run(mut self) -> Result<(RunSummary, S), DomainError> {
        let started = Instant::now();
        info!(workers = self.pool.len(), "Dispatch started");

        let result = self.dispatch().await;
        self.teardown().await;

        let summary = self.summary(started.elapsed());
        result?;
        self.sink.finish(&summary)?;

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            lost = summary.lost,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            peak_outstanding = self.state.peak_outstanding,
            "Dispatch finished"
        );

        Ok((summary, self.sink))
    }

    async fn dispatch(&mut self) -> Result<(), DomainError> {
        self.fill().await;
        self.steady_state().await?;
        self.drain().await
    }

    /// Give every slot a first key; slots stay idle once the stream runs dry.
    async fn fill(&mut self) {
        for id in 0..self.pool.len() {
            if self.feed(id).await == Fed::Exhausted {
                debug!(
                    idle = self.pool.len() - id,
                    "Key stream exhausted while filling"
                );
                break;
            }
        }
    }

    async fn steady_state(&mut self) -> Result<(), DomainError> {
        loop {
            if self.state.outstanding == 0 && !self.restart_idle().await? {
                return Ok(());
            }

            let mut exhausted = false;
            for ready in self.wait_ready().await {
                let id = ready.id;
                let alive = self.collect(ready, true)?;

                if alive && !exhausted {
                    exhausted = self.feed(id).await == Fed::Exhausted;
                }
            }

            if exhausted {
                debug!(
                    outstanding = self.state.outstanding,
                    "Key stream exhausted, draining"
                );
                return Ok(());
            }
        }
    }

    /// Wait only for keys already in flight, retiring each worker as it answers.
    async fn drain(&mut self) -> Result<(), DomainError> {
        while self.state.outstanding > 0 {
            for ready in self.wait_ready().await {
                let id = ready.id;
                if self.collect(ready, false)? {
                    self.pool.handle_mut(id).send_shutdown();
                }
            }
        }
        Ok(())
    }

    async fn teardown(&mut self) {
        let mut signalled = 0;
        for handle in self.pool.handles_mut() {
            if handle.send_shutdown() {
                signalled += 1;
            }
        }

        let tasks = self.pool.take_tasks();
        let waiting = tasks.len();
        trace!(signalled, waiting, "Waiting for workers to stop");

        match timeout(self.options.hung_after, join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        if e.is_panic() {
                            warn!(error = %e, "Worker panicked");
                        }
                    }
                }
            }
            Err(_) => warn!(waiting, "Workers did not stop in time, detaching"),
        }

        self.ready.clear();
    }

    /// Handle one ready channel. Returns true when the worker is still alive
    /// and idle.
    fn collect(&mut self, ready: Readiness, may_respawn: bool) -> Result<bool, DomainError> {
        let Readiness { id, replies, reply } = ready;

        match (replies, reply) {
            (Some(replies), Some(record)) => {
                debug_assert!(
                    !self.pool.handle(id).shutdown_sent(),
                    "reply read from worker {id} after its sentinel"
                );
                self.pool.handle_mut(id).restore_replies(replies);
                self.complete(id, record)?;
                Ok(true)
            }
            _ => {
                self.worker_lost(id, may_respawn);
                Ok(self.pool.handle(id).is_active())
            }
        }
    }

    fn complete(&mut self, id: usize, record: ResultRecord) -> Result<(), DomainError> {
        let in_flight = self.pool.handle_mut(id).complete();
        debug_assert_eq!(in_flight.map(|f| f.key).as_ref(), Some(&record.key));

        self.state.outstanding -= 1;
        self.state.completed += 1;
        match record.outcome {
            Outcome::Success(_) => self.state.succeeded += 1,
            Outcome::NoResult => self.state.no_result += 1,
            Outcome::Timeout => self.state.timed_out += 1,
        }

        trace!(worker = id, key = %record.key, outcome = %record.outcome, "Result received");

        if record.is_visible(self.options.verbose) {
            self.sink.emit(&record)?;
        }
        Ok(())
    }

    /// The worker's channel closed or it was given up on as hung.
    fn worker_lost(&mut self, id: usize, may_respawn: bool) {
        match self.pool.handle_mut(id).complete() {
            Some(in_flight) => {
                self.state.outstanding -= 1;
                self.state.lost += 1;
                warn!(worker = id, key = %in_flight.key, "Worker died with a key in flight");
            }
            None => warn!(worker = id, "Worker channel closed"),
        }

        if may_respawn && self.options.failure_policy == WorkerFailurePolicy::Respawn {
            self.pool.respawn(id);
            info!(worker = id, "Worker respawned");
        } else {
            self.pool.retire(id);
            warn!(
                worker = id,
                active = self.pool.active_count(),
                "Worker slot retired"
            );
        }
    }

    /// Next key to hand out; keys bounced off a dead worker go first.
    async fn next_key(&mut self) -> Option<LookupKey> {
        match self.pending.pop_front() {
            Some(key) => Some(key),
            None => self.keys.next().await,
        }
    }

    async fn feed(&mut self, id: usize) -> Fed {
        match self.next_key().await {
            Some(key) => self.assign(id, key),
            None => Fed::Exhausted,
        }
    }

    fn assign(&mut self, id: usize, key: LookupKey) -> Fed {
        let key = match self.pool.handle_mut(id).assign(key) {
            Ok(()) => {
                self.arm(id);
                return Fed::Dispatched;
            }
            Err(key) => key,
        };

        warn!(worker = id, key = %key, "Worker channel closed before dispatch");
        if self.options.failure_policy == WorkerFailurePolicy::Respawn {
            self.pool.respawn(id);
            match self.pool.handle_mut(id).assign(key) {
                Ok(()) => {
                    self.arm(id);
                    return Fed::Dispatched;
                }
                Err(key) => self.pending.push_front(key),
            }
        } else {
            self.pending.push_front(key);
        }

        self.pool.retire(id);
        Fed::Retired
    }

    /// Start waiting on the reply channel of a worker that just got a key.
    fn arm(&mut self, id: usize) {
        self.state.outstanding += 1;
        self.state.dispatched += 1;
        self.state.peak_outstanding = self.state.peak_outstanding.max(self.state.outstanding);
        debug_assert!(self.state.outstanding <= self.pool.len());

        let handle = self.pool.handle_mut(id);
        let Some(mut replies) = handle.take_replies() else {
            debug_assert!(false, "worker {id} reply channel already lent out");
            return;
        };

        let (abort, registration) = AbortHandle::new_pair();
        handle.set_readiness(abort);

        let wait = Abortable::new(
            async move {
                let reply = replies.recv().await;
                (replies, reply)
            },
            registration,
        );

        self.ready.push(
            async move {
                match wait.await {
                    Ok((replies, reply)) => Readiness {
                        id,
                        replies: Some(replies),
                        reply,
                    },
                    Err(_) => Readiness {
                        id,
                        replies: None,
                        reply: None,
                    },
                }
            }
            .boxed(),
        );
    }

    /// Nothing is in flight: hand a key to an idle slot if one is left.
    /// Returns false once the key stream is exhausted.
    async fn restart_idle(&mut self) -> Result<bool, DomainError> {
        let Some(key) = self.next_key().await else {
            return Ok(false);
        };

        match self.pool.idle_slot() {
            Some(id) => {
                self.assign(id, key);
                Ok(true)
            }
            None => {
                self.pending.push_front(key);
                Err(DomainError::WorkerPoolExhausted(self.pool.len()))
            }
        }
    }

    /// Block until at least one busy worker has replied, or the poll interval
    /// passes. Returns every channel ready at that moment.
    async fn wait_ready(&mut self) -> Vec<Readiness> {
        // Before the wait: a reply already yielded must never be aborted.
        self.abort_overdue();

        let first = match timeout(self.options.poll_interval, self.ready.next()).await {
            Ok(first) => first,
            Err(_) => {
                debug!(
                    outstanding = self.state.outstanding,
                    busy = self.pool.busy_count(),
                    "Waiting for in-flight lookups"
                );
                None
            }
        };

        let Some(first) = first else {
            return Vec::new();
        };

        let mut batch = vec![first];
        while let Some(Some(more)) = self.ready.next().now_or_never() {
            batch.push(more);
        }
        batch
    }

    fn abort_overdue(&mut self) {
        if self.last_overdue_check.elapsed() < self.options.poll_interval {
            return;
        }
        self.last_overdue_check = Instant::now();

        for id in self.pool.overdue(self.options.hung_after) {
            let handle = self.pool.handle_mut(id);
            if let Some(in_flight) = handle.in_flight() {
                warn!(
                    worker = id,
                    key = %in_flight.key,
                    silent_ms = in_flight.since.elapsed().as_millis() as u64,
                    "Worker hung past its deadline, aborting"
                );
            }
            handle.abort();
        }
    }

    fn summary(&self, elapsed: Duration) -> RunSummary {
        RunSummary {
            total: self.state.completed,
            succeeded: self.state.succeeded,
            no_result: self.state.no_result,
            timed_out: self.state.timed_out,
            lost: self.state.lost,
            elapsed,
        }
    }
}
