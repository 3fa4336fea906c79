//! Run one job from its meta JSON and record how it went.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use crate::domain::naming::ensure_parent_dir;
use crate::domain::status::NEVER_RAN;
use crate::domain::{AppError, JobRecord, JobStatus};
use crate::ports::{ProcessRequest, ProcessRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub job_name: String,
    pub exit_status: i32,
}

/// Load the job, run its command under the timeout, then write the stat
/// sidecar and the status file whatever the outcome.
///
/// A command that could not be started is recorded as never run and its
/// error returned after the sidecars are written.
pub fn execute<P: ProcessRunner>(runner: &P, meta: &Path) -> Result<ProcessOutcome, AppError> {
    let job = load_job(meta)?;

    for path in job.output_files.values() {
        ensure_parent_dir(Path::new(path))?;
    }
    let log = job
        .output("log")
        .ok_or_else(|| AppError::config_error(format!("job {} has no log output", job.job_name)))?
        .to_path_buf();

    let host = hostname();
    fs::write(&log, format!("host: {}\n", host))?;

    let request = ProcessRequest {
        command: wrap_command(&job, &log),
        log,
        timeout: Duration::from_secs(job.timeout),
    };

    let start_time = Utc::now().to_rfc3339();
    let result = runner.run(&request);
    let end_time = Utc::now().to_rfc3339();

    let exit_status = match &result {
        Ok(code) => *code,
        Err(e) => {
            tracing::warn!(job = %job.job_name, error = %e, "command did not run");
            NEVER_RAN
        }
    };
    tracing::info!(job = %job.job_name, exit_status, "job finished");

    let job_name = job.job_name.clone();
    write_sidecars(JobStatus { exit_status, host, start_time, end_time, job })?;

    result.map(|exit_status| ProcessOutcome { job_name, exit_status })
}

fn load_job(meta: &Path) -> Result<JobRecord, AppError> {
    let content = fs::read_to_string(meta).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::InputNotFound(meta.display().to_string()),
        _ => AppError::from(e),
    })?;
    serde_json::from_str(&content).map_err(|e| AppError::parse_error(meta.display().to_string(), e))
}

/// Wrap the job's command the way the generated scripts do, so `$timeout`
/// and `$log_file` resolve inside it.
fn wrap_command(job: &JobRecord, log: &Path) -> String {
    format!(
        "timeout={}\nlog_file={}\nfunction wlpipe_run_code() {{\n{}\n}}\nwlpipe_run_code\n",
        job.timeout,
        log.display(),
        job.command.trim_end()
    )
}

fn write_sidecars(status: JobStatus) -> Result<(), AppError> {
    if let Some(stat) = status.job.output("stat") {
        let content =
            serde_yaml::to_string(&status).map_err(|e| AppError::parse_error("job status", e))?;
        fs::write(stat, content)?;
    }
    if let Some(path) = status.job.output("status") {
        fs::write(path, format!("{}\n", status.exit_status))?;
    }
    Ok(())
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| fs::read_to_string("/etc/hostname").ok().map(|h| h.trim().to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
