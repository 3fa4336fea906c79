//! Create and show run configurations.

use crate::domain::run_config::next_run_name;
use crate::domain::{AppError, RunConfig, RunConfigError, RunConfigRequest, RunId};
use crate::ports::RunConfigStore;

/// Options for `runconfig new`.
#[derive(Debug, Clone)]
pub struct NewRunOptions {
    pub request: RunConfigRequest,
    /// Explicit name; the next free one is picked otherwise.
    pub run: Option<RunId>,
    pub test: bool,
    pub ppn: Option<u32>,
    pub nodes: Option<u32>,
    pub queue: Option<String>,
    pub version: Option<String>,
    pub config: Option<String>,
    pub dry_run: bool,
}

impl NewRunOptions {
    pub fn new(request: RunConfigRequest) -> Self {
        Self {
            request,
            run: None,
            test: false,
            ppn: None,
            nodes: None,
            queue: None,
            version: None,
            config: None,
            dry_run: false,
        }
    }
}

/// Build, validate and store a new run configuration.
///
/// Software versions are read through `env`. Existing configs are never
/// overwritten.
pub fn create<S, E>(store: &S, options: NewRunOptions, env: E) -> Result<RunConfig, AppError>
where
    S: RunConfigStore,
    E: Fn(&str) -> Option<String>,
{
    let NewRunOptions { request, run, test, ppn, nodes, queue, version, config, dry_run } =
        options;

    let run = match run {
        Some(run) if store.exists(&run) => {
            return Err(RunConfigError::AlreadyExists(run.to_string()).into());
        }
        Some(run) => run,
        None => next_run_name(request.run_type, request.band.first(), test, |r| store.exists(r))?,
    };

    let mut built = request.build(run, env)?;
    built.ppn = ppn;
    built.nodes = nodes;
    built.queue = queue;
    built.version = version;
    built.config = config;
    built.validate()?;

    if dry_run {
        tracing::info!(run = %built.run, "dry run, config not written");
    } else {
        store.save(&built)?;
    }
    Ok(built)
}

pub fn show<S: RunConfigStore>(store: &S, run: &RunId) -> Result<RunConfig, AppError> {
    store.load(run)
}
