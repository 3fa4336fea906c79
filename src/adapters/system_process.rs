use std::fs::OpenOptions;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::AppError;
use crate::domain::status::TIMED_OUT;
use crate::ports::{ProcessRequest, ProcessRunner};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs job commands with `bash -c` on this host.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, request: &ProcessRequest) -> Result<i32, AppError> {
        let failed = |e: std::io::Error| AppError::ProcessFailed {
            command: request.command.clone(),
            details: e.to_string(),
        };

        let log = OpenOptions::new().create(true).append(true).open(&request.log)?;
        let log_err = log.try_clone()?;

        let mut command = Command::new("bash");
        command
            .arg("-c")
            .arg(&request.command)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own group, so a timeout reaches everything the job started.
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(failed)?;

        let deadline = Instant::now() + request.timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(failed)? {
                return Ok(exit_code(status));
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    command = %request.command,
                    timeout_secs = request.timeout.as_secs(),
                    "command timed out, killing it"
                );
                kill_job(&mut child);
                return Ok(TIMED_OUT);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kill the job's whole process group, then reap the shell.
fn kill_job(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            unsafe { libc::kill(-pgid, libc::SIGKILL) };
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Exit code, or `128 + signal` for a signalled child as the shell reports it.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
