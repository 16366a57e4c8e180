pub mod writer_sink;

pub use writer_sink::{FileSink, StdoutSink, WriterSink};
