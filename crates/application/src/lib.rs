//! Ferrous Sweep Application Layer
//!
//! Ports to the outside world plus the concurrent dispatch engine behind them.

pub mod ports;
pub mod services;
pub mod use_cases;
