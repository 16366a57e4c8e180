use std::fmt;
use std::time::Duration;

/// End-of-run totals reported after teardown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Keys whose result was read back from a worker.
    pub total: u64,
    pub succeeded: u64,
    pub no_result: u64,
    pub timed_out: u64,
    /// Keys whose worker died before replying.
    pub lost: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Elapsed time with a one second floor, so the rate is always defined.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64().max(1.0)
    }

    /// Keys per second.
    pub fn rate(&self) -> f64 {
        self.total as f64 / self.elapsed_secs()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "# {} queries in {:.2}s, {} resolved ({:.1} queries/sec)",
            self.total,
            self.elapsed_secs(),
            self.succeeded,
            self.rate()
        )?;
        if self.lost > 0 {
            write!(f, ", {} lost", self.lost)?;
        }
        Ok(())
    }
}
