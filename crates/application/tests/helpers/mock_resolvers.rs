use async_trait::async_trait;
use ferrous_sweep_application::ports::{Resolver, ResultSink};
use ferrous_sweep_domain::{DomainError, LookupKey, QueryType, ResultRecord, RunSummary};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Mock Resolver
// ============================================================================

/// Deterministic resolver with concurrency accounting.
#[derive(Default)]
pub struct MockResolver {
    answers: HashMap<String, Vec<String>>,
    delay: Duration,
    panic_on: Option<String>,
    hang_on: Option<String>,
    calls: AtomicU64,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, key: &str, values: &[&str]) -> Self {
        self.answers.insert(
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Answers every key with its own name reversed, so results are
    /// deterministic and distinct.
    pub fn echoing(keys: &[String]) -> Self {
        let mut resolver = Self::new();
        for key in keys {
            let value: String = key.chars().rev().collect();
            resolver.answers.insert(key.clone(), vec![value]);
        }
        resolver
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Panic on every key containing `needle`.
    pub fn panicking_on(mut self, needle: &str) -> Self {
        self.panic_on = Some(needle.to_string());
        self
    }

    /// Never return for keys containing `needle`.
    pub fn hanging_on(mut self, needle: &str) -> Self {
        self.hang_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn query(
        &self,
        key: &LookupKey,
        _query_type: QueryType,
    ) -> Result<Vec<String>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(ref needle) = self.panic_on {
            if key.as_str().contains(needle.as_str()) {
                panic!("resolver blew up on {key}");
            }
        }

        if let Some(ref needle) = self.hang_on {
            if key.as_str().contains(needle.as_str()) {
                std::future::pending::<()>().await;
            }
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(self.answers.get(key.as_str()).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Accepts `ok_lines` records, then fails every write.
pub struct FailingSink {
    pub ok_lines: usize,
    pub written: usize,
}

impl ResultSink for FailingSink {
    fn emit(&mut self, _record: &ResultRecord) -> Result<(), DomainError> {
        if self.written >= self.ok_lines {
            return Err(DomainError::IoError("Broken pipe".to_string()));
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self, _summary: &RunSummary) -> Result<(), DomainError> {
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("host{i}.example.com")).collect()
}
