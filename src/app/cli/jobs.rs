//! `wlpipe generate`, `process` and `check`.

use std::path::Path;

use crate::app::AppContext;
use crate::app::commands::{check, generate, process};
use crate::domain::{AppError, RunId, Scheduler};
use crate::ports::{FileListSource, ProcessRunner, RowCountSource, RunConfigStore};

pub fn run_generate<F, R, S, P>(
    ctx: &AppContext<F, R, S, P>,
    run: &str,
    scheduler: Scheduler,
    missing: bool,
    tile: Option<String>,
    dry_run: bool,
) -> Result<(), AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    let options =
        generate::GenerateOptions { run: RunId::new(run)?, scheduler, missing, tile, dry_run };
    let outcome = generate::execute(ctx, &options)?;

    if outcome.dry_run {
        println!("Dry run: {} file(s) would be written", outcome.files.len());
        for path in &outcome.files {
            println!("  {}", path.display());
        }
    } else {
        println!(
            "✅ Generated {} {} job(s) for {} ({} file(s))",
            outcome.njobs,
            outcome.scheduler,
            outcome.run,
            outcome.files.len()
        );
    }
    if outcome.skipped > 0 {
        println!("Skipped {} job(s) with outputs present", outcome.skipped);
    }
    Ok(())
}

/// Exits with the job's own status.
pub fn run_process<F, R, S, P>(ctx: &AppContext<F, R, S, P>, meta: &Path) -> Result<i32, AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    let outcome = process::execute(ctx.runner(), meta)?;
    println!("{}: exit status {}", outcome.job_name, outcome.exit_status);
    Ok(outcome.exit_status)
}

/// Exits non-zero when any job is bad.
pub fn run_check<F, R, S, P>(ctx: &AppContext<F, R, S, P>, run: &str) -> Result<i32, AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    let outcome = check::execute(ctx, &RunId::new(run)?)?;
    println!("{}: {} good, {} bad", outcome.run, outcome.good, outcome.bad());
    if outcome.bad() > 0 {
        println!("  failed: {}", outcome.failed);
        println!("  missing outputs: {}", outcome.missing_outputs);
        println!("  no status: {}", outcome.no_status);
    }
    println!("good list: {}", outcome.goodlist.display());
    println!("bad list: {}", outcome.badlist.display());
    Ok(if outcome.bad() > 0 { 1 } else { 0 })
}
