//! Generate job scripts, scheduler files and the job manifest for a run.

mod builder;
mod render;

use std::fs;
use std::path::PathBuf;

use crate::app::AppContext;
use crate::app::commands::module_named;
use crate::domain::naming::ensure_parent_dir;
use crate::domain::{AppError, CoaddInfoCache, JobManifest, JobRecord, RunId, Scheduler};
use crate::ports::{FileListSource, ProcessRunner, RowCountSource, RunConfigStore};

pub use builder::{BuiltJobs, ManifestBuilder, UpstreamRun, module_load_lines};
pub use render::Renderer;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub run: RunId,
    pub scheduler: Scheduler,
    /// Skip jobs whose module outputs all exist.
    pub missing: bool,
    pub tile: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub run: RunId,
    pub scheduler: Scheduler,
    /// Jobs with scripts rendered.
    pub njobs: usize,
    /// Jobs left out because their outputs exist.
    pub skipped: usize,
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
}

/// One file to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
    pub executable: bool,
}

impl RenderedFile {
    pub fn write(&self) -> Result<(), AppError> {
        ensure_parent_dir(&self.path)?;
        fs::write(&self.path, &self.content)?;

        #[cfg(unix)]
        if self.executable {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&self.path, perms)?;
        }
        Ok(())
    }
}

pub fn execute<F, R, S, P>(
    ctx: &AppContext<F, R, S, P>,
    options: &GenerateOptions,
) -> Result<GenerateOutcome, AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    let config = ctx.runconfigs().load(&options.run)?;
    let module = module_named(config.run_type.module_name())?;
    let desdata = ctx.settings().paths.desdata();

    let serun = match (&config.serun, module.serun_inputs.is_empty()) {
        (Some(run), false) => Some(UpstreamRun::new(ctx.runconfigs().load(run)?, desdata)?),
        _ => None,
    };
    let detrun = match (&config.detrun, config.distinct_detband()) {
        (Some(run), Some(_)) => Some(UpstreamRun::new(ctx.runconfigs().load(run)?, desdata)?),
        _ => None,
    };

    let mut builder = ManifestBuilder::new(
        &config,
        &module,
        desdata,
        ctx.file_lists(),
        ctx.rows(),
        ctx.templates(),
        serun.as_ref(),
        detrun.as_ref(),
    )?;
    if options.dry_run {
        builder = builder.without_cache_writes();
    }

    let mut cache = CoaddInfoCache::new();
    let built = builder.build(&mut cache, options.tile.as_deref())?;

    let emitted: Vec<&JobRecord> = built
        .jobs
        .iter()
        .filter(|job| {
            let keep = !options.missing || !job.missing_products().is_empty();
            if !keep {
                tracing::debug!(job = %job.job_name, "outputs present, skipping");
            }
            keep
        })
        .collect();
    let skipped = built.jobs.len() - emitted.len();

    let layout = ctx.submit_layout();
    let renderer =
        Renderer::new(ctx.templates(), &ctx.settings().scheduler, &config, &module, &layout);

    let mut files = built.inputs.clone();
    for job in &emitted {
        files.extend(renderer.job_files(job)?);
    }
    files.extend(renderer.scheduler_files(options.scheduler, &emitted)?);
    files.push(manifest_file(&builder, &config.run, module.name, &built)?);

    tracing::info!(
        run = %config.run,
        jobs = emitted.len(),
        skipped,
        files = files.len(),
        "generated"
    );

    if !options.dry_run {
        for file in &files {
            file.write()?;
        }
    }

    Ok(GenerateOutcome {
        run: config.run.clone(),
        scheduler: options.scheduler,
        njobs: emitted.len(),
        skipped,
        files: files.into_iter().map(|f| f.path).collect(),
        dry_run: options.dry_run,
    })
}

/// Index of every job built, including skipped ones.
fn manifest_file<F: FileListSource, R: RowCountSource>(
    builder: &ManifestBuilder<'_, F, R>,
    run: &RunId,
    module: &str,
    built: &BuiltJobs,
) -> Result<RenderedFile, AppError> {
    let manifest = JobManifest {
        run: run.clone(),
        module: module.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        jobs: built.jobs.clone(),
    };
    let mut content = serde_json::to_string_pretty(&manifest)
        .map_err(|e| AppError::parse_error("job manifest", e))?;
    content.push('\n');
    Ok(RenderedFile {
        path: builder.resolver().manifest_path(builder.fileclass(), run),
        content,
        executable: false,
    })
}
