use std::path::PathBuf;
use std::time::Duration;

use crate::domain::AppError;

/// A shell command to run on behalf of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Passed to `bash -c`.
    pub command: String,
    /// stdout and stderr are appended here.
    pub log: PathBuf,
    pub timeout: Duration,
}

/// Port for running job commands.
pub trait ProcessRunner {
    /// Run to completion and return the exit status.
    ///
    /// A command that outlives its timeout is killed and reports 124.
    fn run(&self, request: &ProcessRequest) -> Result<i32, AppError>;
}
