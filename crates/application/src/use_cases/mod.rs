pub mod sweep;

pub use sweep::RunSweepUseCase;
