pub mod dispatcher;
pub mod generator;
pub mod pool;
pub mod worker;

pub use dispatcher::{Dispatcher, DispatcherOptions, PoolState};
pub use generator::{DomainGenerator, KeyStream};
pub use pool::{WorkerHandle, WorkerPool};
pub use worker::{Worker, WorkerMessage, WorkerSpec};
