use crate::ports::Resolver;
use ferrous_sweep_domain::{DomainError, LookupKey, Outcome, QueryType, ResultRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Message from the dispatcher to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    Work(LookupKey),
    /// Finish and exit. Never followed by another message.
    Shutdown,
}

/// Everything a worker needs to resolve keys; cloned into every slot.
#[derive(Clone)]
pub struct WorkerSpec {
    pub resolver: Arc<dyn Resolver>,
    pub query_type: QueryType,
    pub timeout: Duration,
}

impl WorkerSpec {
    pub fn new(resolver: Arc<dyn Resolver>, query_type: QueryType, timeout: Duration) -> Self {
        Self {
            resolver,
            query_type,
            timeout,
        }
    }
}

impl std::fmt::Debug for WorkerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerSpec")
            .field("query_type", &self.query_type)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Dispatcher-side ends of a worker's channel pair.
pub struct WorkerChannels {
    pub inbox: mpsc::Sender<WorkerMessage>,
    pub replies: mpsc::Receiver<ResultRecord>,
    pub task: JoinHandle<()>,
}

/// Isolated execution unit: resolves one key at a time and answers on its
/// own channel. Holds no state between iterations besides its channels.
pub struct Worker {
    id: usize,
    spec: WorkerSpec,
    inbox: mpsc::Receiver<WorkerMessage>,
    replies: mpsc::Sender<ResultRecord>,
}

impl Worker {
    /// Spawn a worker task and return the dispatcher's ends of its channels.
    ///
    /// Both directions have capacity one: the dispatcher only writes to an
    /// idle worker, and a worker only replies once per key.
    pub fn spawn(id: usize, spec: WorkerSpec) -> WorkerChannels {
        let (inbox_tx, inbox_rx) = mpsc::channel(1);
        let (reply_tx, reply_rx) = mpsc::channel(1);

        let worker = Worker {
            id,
            spec,
            inbox: inbox_rx,
            replies: reply_tx,
        };
        let task = tokio::spawn(worker.run());

        WorkerChannels {
            inbox: inbox_tx,
            replies: reply_rx,
            task,
        }
    }

    async fn run(mut self) {
        trace!(worker = self.id, "Worker started");

        while let Some(message) = self.inbox.recv().await {
            let key = match message {
                WorkerMessage::Work(key) => key,
                WorkerMessage::Shutdown => break,
            };

            let record = execute(&self.spec, key).await;

            if self.replies.send(record).await.is_err() {
                debug!(worker = self.id, "Dispatcher gone, worker exiting");
                return;
            }
        }

        trace!(worker = self.id, "Worker stopped");
    }
}

/// Resolve one key under the hard deadline and classify the outcome.
///
/// The resolver future is dropped when the deadline passes, so nothing from
/// an abandoned call outlives this function.
pub async fn execute(spec: &WorkerSpec, key: LookupKey) -> ResultRecord {
    match timeout(spec.timeout, spec.resolver.query(&key, spec.query_type)).await {
        Ok(Ok(values)) => ResultRecord::success(key, values),
        Ok(Err(DomainError::QueryTimeout)) => ResultRecord::new(key, Outcome::Timeout),
        Ok(Err(e)) => {
            debug!(key = %key, error = %e, "Lookup failed");
            ResultRecord::new(key, Outcome::NoResult)
        }
        Err(_) => {
            debug!(key = %key, timeout_ms = spec.timeout.as_millis() as u64, "Lookup deadline elapsed");
            ResultRecord::new(key, Outcome::Timeout)
        }
    }
}
