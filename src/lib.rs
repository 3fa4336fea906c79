//! wlpipe: name DES weak-lensing pipeline outputs and generate batch jobs for them.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::AppContext;
pub use app::commands::check::CheckOutcome;
pub use app::commands::generate::{GenerateOptions, GenerateOutcome};
pub use app::commands::path::PathOptions;
pub use app::commands::process::ProcessOutcome;
pub use app::commands::runconfig::NewRunOptions;
pub use domain::{AppError, Chunk, PathResolver, RunConfig, RunId, Scheduler, Settings, chunks};
