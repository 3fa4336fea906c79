//! Scheduler walltime requests, rounded up to whole hours.

use std::fmt;

const SECONDS_PER_HOUR: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Walltime {
    pub hours: u64,
}

impl Walltime {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { hours: seconds.div_ceil(SECONDS_PER_HOUR).max(1) }
    }
}

impl fmt::Display for Walltime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:00:00", self.hours)
    }
}

/// Walltime of a single job, unless the module pins one.
pub fn job_walltime(seconds_per_job: u64, override_hours: Option<u64>) -> Walltime {
    match override_hours {
        Some(hours) => Walltime { hours: hours.max(1) },
        None => Walltime::from_seconds(seconds_per_job),
    }
}

/// Walltime of a minions batch running `njobs` jobs over `ncpu` CPUs.
pub fn minions_walltime(seconds_per_job: u64, njobs: u64, ncpu: u64) -> Walltime {
    let total = seconds_per_job.saturating_mul(njobs);
    Walltime::from_seconds(total.div_ceil(ncpu.max(1)))
}
