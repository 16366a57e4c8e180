use ferrous_sweep_application::ports::ResultSink;
use ferrous_sweep_domain::{DomainError, ResultRecord, RunSummary};
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

pub type StdoutSink = WriterSink<BufWriter<Stdout>>;
pub type FileSink = WriterSink<BufWriter<File>>;

/// Writes one `key\tvalues` line per record and the summary line last.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    lines: u64,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }
}

impl FileSink {
    /// Create (or truncate) `path`.
    pub fn create(path: &Path) -> Result<Self, DomainError> {
        let file = File::create(path).map_err(|e| {
            DomainError::IoError(format!("Failed to create '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> ResultSink for WriterSink<W> {
    fn emit(&mut self, record: &ResultRecord) -> Result<(), DomainError> {
        writeln!(self.writer, "{}", record)?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), DomainError> {
        writeln!(self.writer, "{}", summary)?;
        self.writer.flush()?;
        Ok(())
    }
}
