use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NamingError;

/// Batch system a run's job files are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheduler {
    Pbs,
    Condor,
    Wq,
}

impl Scheduler {
    pub const ALL: [Scheduler; 3] = [Scheduler::Pbs, Scheduler::Condor, Scheduler::Wq];

    /// Top-level directory under the submit root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Scheduler::Pbs => "pbs",
            Scheduler::Condor => "condor",
            Scheduler::Wq => "wq",
        }
    }

    /// Extension of per-job submit files.
    pub fn job_ext(&self) -> &'static str {
        match self {
            Scheduler::Pbs => "pbs",
            Scheduler::Condor => "condor",
            Scheduler::Wq => "yaml",
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Scheduler {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Scheduler::ALL.into_iter().find(|sched| sched.dir_name() == lower).ok_or_else(|| {
            NamingError::InvalidArgument(format!(
                "unknown scheduler '{}': expected pbs, condor or wq",
                s
            ))
        })
    }
}
