use super::worker::{Worker, WorkerChannels, WorkerMessage, WorkerSpec};
use ferrous_sweep_domain::{LookupKey, ResultRecord};
use futures::future::AbortHandle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// A key handed to a worker and not answered yet.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub key: LookupKey,
    pub since: Instant,
}

/// Dispatcher-owned view of one worker slot.
pub struct WorkerHandle {
    pub id: usize,
    inbox: mpsc::Sender<WorkerMessage>,
    replies: Option<mpsc::Receiver<ResultRecord>>,
    task: Option<JoinHandle<()>>,
    in_flight: Option<InFlight>,
    readiness: Option<AbortHandle>,
    shutdown_sent: bool,
    retired: bool,
}

impl WorkerHandle {
    fn spawn(id: usize, spec: WorkerSpec) -> Self {
        let WorkerChannels {
            inbox,
            replies,
            task,
        } = Worker::spawn(id, spec);

        Self {
            id,
            inbox,
            replies: Some(replies),
            task: Some(task),
            in_flight: None,
            readiness: None,
            shutdown_sent: false,
            retired: false,
        }
    }

    /// Hand a key to an idle worker. Gives the key back when the worker's
    /// channel is already closed.
    pub fn assign(&mut self, key: LookupKey) -> Result<(), LookupKey> {
        debug_assert!(self.in_flight.is_none(), "worker {} already busy", self.id);
        debug_assert!(!self.shutdown_sent, "worker {} already shut down", self.id);

        match self.inbox.try_send(WorkerMessage::Work(key.clone())) {
            Ok(()) => {
                self.in_flight = Some(InFlight {
                    key,
                    since: Instant::now(),
                });
                Ok(())
            }
            Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => Err(key),
        }
    }

    /// Clears and returns the in-flight key.
    pub fn complete(&mut self) -> Option<InFlight> {
        self.readiness = None;
        self.in_flight.take()
    }

    /// Lend the reply receiver out to the readiness set.
    pub fn take_replies(&mut self) -> Option<mpsc::Receiver<ResultRecord>> {
        self.replies.take()
    }

    pub fn restore_replies(&mut self, replies: mpsc::Receiver<ResultRecord>) {
        self.replies = Some(replies);
    }

    pub fn set_readiness(&mut self, abort: AbortHandle) {
        self.readiness = Some(abort);
    }

    /// Returns true if this call sent the sentinel.
    pub fn send_shutdown(&mut self) -> bool {
        if self.shutdown_sent || self.retired {
            return false;
        }
        self.shutdown_sent = true;
        // Queued behind any query in progress; a closed channel means the
        // worker is already gone.
        let _ = self.inbox.try_send(WorkerMessage::Shutdown);
        true
    }

    /// Stop waiting on this worker: abort its task and its pending readiness.
    pub fn abort(&mut self) {
        if let Some(task) = self.task.as_ref() {
            task.abort();
        }
        if let Some(readiness) = self.readiness.take() {
            readiness.abort();
        }
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Still accepting work: not retired and not told to shut down.
    pub fn is_active(&self) -> bool {
        !self.retired && !self.shutdown_sent
    }

    pub fn shutdown_sent(&self) -> bool {
        self.shutdown_sent
    }

    /// True while waiting on a key for longer than `limit`.
    pub fn is_overdue(&self, limit: Duration) -> bool {
        self.readiness.is_some()
            && self
                .in_flight
                .as_ref()
                .is_some_and(|f| f.since.elapsed() > limit)
    }
}

/// The fixed set of P worker slots, created once at startup.
pub struct WorkerPool {
    spec: WorkerSpec,
    handles: Vec<WorkerHandle>,
}

impl WorkerPool {
    pub fn start(size: usize, spec: WorkerSpec) -> Self {
        let handles = (0..size)
            .map(|id| WorkerHandle::spawn(id, spec.clone()))
            .collect();
        debug!(workers = size, "Worker pool started");
        Self { spec, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, id: usize) -> &WorkerHandle {
        &self.handles[id]
    }

    pub fn handle_mut(&mut self, id: usize) -> &mut WorkerHandle {
        &mut self.handles[id]
    }

    pub fn handles_mut(&mut self) -> impl Iterator<Item = &mut WorkerHandle> {
        self.handles.iter_mut()
    }

    /// Replace the worker in slot `id` with a fresh one.
    pub fn respawn(&mut self, id: usize) {
        self.handles[id].abort();
        self.handles[id] = WorkerHandle::spawn(id, self.spec.clone());
    }

    /// Take slot `id` out of service for the rest of the run.
    pub fn retire(&mut self, id: usize) {
        let handle = &mut self.handles[id];
        handle.abort();
        handle.retired = true;
        handle.task = None;
    }

    /// First slot that can take a key right now.
    pub fn idle_slot(&self) -> Option<usize> {
        self.handles
            .iter()
            .position(|h| h.is_active() && !h.is_busy())
    }

    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_active()).count()
    }

    pub fn busy_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_busy()).count()
    }

    pub fn overdue(&self, limit: Duration) -> Vec<usize> {
        self.handles
            .iter()
            .filter(|h| h.is_overdue(limit))
            .map(|h| h.id)
            .collect()
    }

    /// Join handles of every slot not retired, leaving the slots empty.
    pub fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        self.handles
            .iter_mut()
            .filter_map(|h| h.task.take())
            .collect()
    }
}
