use std::sync::Mutex;

use crate::domain::AppError;
use crate::ports::{ProcessRequest, ProcessRunner};

/// Records requests and answers with a fixed exit status.
pub struct RecordingRunner {
    pub exit_status: i32,
    pub fail_to_start: bool,
    pub requests: Mutex<Vec<ProcessRequest>>,
}

impl RecordingRunner {
    pub fn new(exit_status: i32) -> Self {
        Self { exit_status, fail_to_start: false, requests: Mutex::new(Vec::new()) }
    }

    pub fn failing_to_start() -> Self {
        Self { fail_to_start: true, ..Self::new(0) }
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, request: &ProcessRequest) -> Result<i32, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_to_start {
            return Err(AppError::ProcessFailed {
                command: request.command.clone(),
                details: "bash not found".into(),
            });
        }
        Ok(self.exit_status)
    }
}
