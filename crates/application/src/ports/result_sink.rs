use ferrous_sweep_domain::{DomainError, ResultRecord, RunSummary};

/// Line-oriented destination for result records and the closing summary.
pub trait ResultSink: Send {
    fn emit(&mut self, record: &ResultRecord) -> Result<(), DomainError>;

    fn finish(&mut self, summary: &RunSummary) -> Result<(), DomainError>;
}

/// Keeps everything in memory; used by tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ResultRecord>,
    pub summary: Option<RunSummary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }
}

impl ResultSink for MemorySink {
    fn emit(&mut self, record: &ResultRecord) -> Result<(), DomainError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), DomainError> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn emit(&mut self, record: &ResultRecord) -> Result<(), DomainError> {
        (**self).emit(record)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), DomainError> {
        (**self).finish(summary)
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn emit(&mut self, record: &ResultRecord) -> Result<(), DomainError> {
        (**self).emit(record)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), DomainError> {
        (**self).finish(summary)
    }
}
