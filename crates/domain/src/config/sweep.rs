use crate::QueryType;
use serde::{Deserialize, Serialize};

/// What the dispatcher does with a slot whose worker died mid-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerFailurePolicy {
    /// Start a fresh worker in the same slot.
    #[default]
    Respawn,
    /// Leave the slot empty for the rest of the run.
    Retire,
}

impl WorkerFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerFailurePolicy::Respawn => "respawn",
            WorkerFailurePolicy::Retire => "retire",
        }
    }
}

impl std::str::FromStr for WorkerFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "respawn" => Ok(WorkerFailurePolicy::Respawn),
            "retire" => Ok(WorkerFailurePolicy::Retire),
            other => Err(format!(
                "Unknown worker failure policy '{}' (expected respawn or retire)",
                other
            )),
        }
    }
}

/// Sweep configuration consumed by the dispatch engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Pool size; the only concurrency bound of a run.
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub query_type: QueryType,

    /// Hard per-query deadline.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sets the RD flag on outgoing queries.
    #[serde(default = "default_true")]
    pub recursion: bool,

    /// Nameserver override (`ip` or `ip:port`). Uses resolv.conf when unset.
    #[serde(default)]
    pub nameserver: Option<String>,

    /// Emit no-result and timeout lines too.
    #[serde(default)]
    pub verbose: bool,

    /// Period of the bounded readiness wait, used for drain progress and
    /// hung-worker checks.
    #[serde(default = "default_drain_poll_ms")]
    pub drain_poll_ms: u64,

    /// Extra time past the query deadline before a silent worker is aborted.
    #[serde(default = "default_hung_grace_ms")]
    pub hung_grace_ms: u64,

    #[serde(default)]
    pub worker_failure: WorkerFailurePolicy,

    /// How far key generation may run ahead of the dispatcher.
    #[serde(default = "default_generator_buffer")]
    pub generator_buffer: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            query_type: QueryType::default(),
            timeout_secs: default_timeout_secs(),
            recursion: true,
            nameserver: None,
            verbose: false,
            drain_poll_ms: default_drain_poll_ms(),
            hung_grace_ms: default_hung_grace_ms(),
            worker_failure: WorkerFailurePolicy::default(),
            generator_buffer: default_generator_buffer(),
        }
    }
}

fn default_workers() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_drain_poll_ms() -> u64 {
    250
}

fn default_hung_grace_ms() -> u64 {
    2000
}

fn default_generator_buffer() -> usize {
    65_536
}
