pub mod resolver;
pub mod result_sink;

pub use resolver::Resolver;
pub use result_sink::{MemorySink, ResultSink};
