//! Adapters for the sweep engine's ports, built on hickory-proto and tokio.

pub mod dns;
pub mod output;
pub mod sources;
pub mod system;
