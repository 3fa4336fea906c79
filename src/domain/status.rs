//! Exit-status sidecars and job classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::job::JobRecord;

/// Exit status recorded when the command never ran.
pub const NEVER_RAN: i32 = -9999;

/// Exit status recorded when the command hit its timeout.
pub const TIMED_OUT: i32 = 124;

/// Structured record written at a job's `stat` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub exit_status: i32,
    pub host: String,
    /// RFC 3339
    pub start_time: String,
    /// RFC 3339
    pub end_time: String,
    pub job: JobRecord,
}

/// Result of checking one job after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum JobOutcome {
    Ok,
    Failed(i32),
    MissingOutputs(Vec<String>),
    NoStatus,
}

impl JobOutcome {
    /// Exit status first, then products.
    pub fn classify(exit_status: Option<i32>, missing: Vec<String>) -> Self {
        match exit_status {
            None => JobOutcome::NoStatus,
            Some(0) if missing.is_empty() => JobOutcome::Ok,
            Some(0) => JobOutcome::MissingOutputs(missing),
            Some(code) => JobOutcome::Failed(code),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, JobOutcome::Ok)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Ok => write!(f, "ok"),
            JobOutcome::Failed(code) => write!(f, "failed (exit {})", code),
            JobOutcome::MissingOutputs(paths) => write!(f, "missing {} output(s)", paths.len()),
            JobOutcome::NoStatus => write!(f, "no status"),
        }
    }
}

/// Parse the one-line exit status the job script writes.
pub fn parse_status_text(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}
