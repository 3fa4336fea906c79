//! Classify every job of a run from its status sidecars.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::app::commands::generate::RenderedFile;
use crate::domain::status::parse_status_text;
use crate::domain::{AppError, JobManifest, JobOutcome, JobRecord, JobStatus, RunId};
use crate::ports::{FileListSource, ProcessRunner, RowCountSource, RunConfigStore};

/// One entry of the good or bad list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedJob {
    pub job_name: String,
    pub outcome: JobOutcome,
    pub job: JobRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub run: RunId,
    pub good: usize,
    pub failed: usize,
    pub missing_outputs: usize,
    pub no_status: usize,
    pub goodlist: PathBuf,
    pub badlist: PathBuf,
}

impl CheckOutcome {
    pub fn bad(&self) -> usize {
        self.failed + self.missing_outputs + self.no_status
    }
}

pub fn execute<F, R, S, P>(
    ctx: &AppContext<F, R, S, P>,
    run: &RunId,
) -> Result<CheckOutcome, AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    let config = ctx.runconfigs().load(run)?;
    let resolver = ctx.resolver();
    let manifest_path = resolver.manifest_path(&config.fileclass, run);
    let manifest: JobManifest = read_manifest(&manifest_path)?;

    let mut good = Vec::new();
    let mut bad = Vec::new();
    let (mut failed, mut missing_outputs, mut no_status) = (0, 0, 0);
    for job in manifest.jobs {
        let outcome = JobOutcome::classify(exit_status(&job), job.missing_products());
        match &outcome {
            JobOutcome::Ok => {}
            JobOutcome::Failed(_) => failed += 1,
            JobOutcome::MissingOutputs(_) => missing_outputs += 1,
            JobOutcome::NoStatus => no_status += 1,
        }
        let checked = CheckedJob { job_name: job.job_name.clone(), outcome, job };
        if checked.outcome.is_ok() {
            good.push(checked);
        } else {
            bad.push(checked);
        }
    }

    let goodlist = resolver.collated_path(&config.fileclass, run, "goodlist", "json")?;
    let badlist = resolver.collated_path(&config.fileclass, run, "badlist", "json")?;
    list_file(&goodlist, &good)?.write()?;
    list_file(&badlist, &bad)?.write()?;
    tracing::info!(run = %run, good = good.len(), bad = bad.len(), "checked run");

    Ok(CheckOutcome {
        run: run.clone(),
        good: good.len(),
        failed,
        missing_outputs,
        no_status,
        goodlist,
        badlist,
    })
}

fn read_manifest(path: &Path) -> Result<JobManifest, AppError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::InputNotFound(format!("job manifest {}", path.display()))
        }
        _ => AppError::from(e),
    })?;
    serde_json::from_str(&content).map_err(|e| AppError::parse_error(path.display().to_string(), e))
}

/// Exit status from the stat sidecar, else the status file.
fn exit_status(job: &JobRecord) -> Option<i32> {
    if let Some(stat) = job.output("stat").filter(|p| p.exists()) {
        match fs::read_to_string(stat).map_err(|e| e.to_string()).and_then(|content| {
            serde_yaml::from_str::<JobStatus>(&content).map_err(|e| e.to_string())
        }) {
            Ok(status) => return Some(status.exit_status),
            Err(e) => tracing::warn!(path = %stat.display(), error = %e, "unreadable stat file"),
        }
    }

    let path = job.output("status").filter(|p| p.exists())?;
    match fs::read_to_string(path) {
        Ok(text) => {
            let status = parse_status_text(&text);
            if status.is_none() {
                tracing::warn!(path = %path.display(), "unreadable status file");
            }
            status
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable status file");
            None
        }
    }
}

fn list_file(path: &Path, jobs: &[CheckedJob]) -> Result<RenderedFile, AppError> {
    let mut content = serde_json::to_string_pretty(jobs)
        .map_err(|e| AppError::parse_error("job list", e))?;
    content.push('\n');
    Ok(RenderedFile { path: path.to_path_buf(), content, executable: false })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;
    use crate::adapters::TemplateEngine;
    use crate::domain::{ProcessingKind, RunType, UnitSpec};
    use crate::testing::fixtures::{run_config, settings};
    use crate::testing::{FakeFileLists, FakeRowCounts, MemoryRunConfigStore, RecordingRunner};

    fn job(dir: &Path, exposure: &str) -> JobRecord {
        let out = |what: &str| dir.join(format!("{}-{}", exposure, what)).display().to_string();
        JobRecord {
            run: RunId::new("am001i").unwrap(),
            module: "am".into(),
            unit: UnitSpec::exposure(exposure, 7).to_unit(ProcessingKind::SingleEpoch).unwrap(),
            range: None,
            job_name: exposure.to_string(),
            input_files: BTreeMap::new(),
            output_files: BTreeMap::from([
                ("am".into(), out("am.fits")),
                ("stat".into(), out("stat.yaml")),
                ("status".into(), out("status.txt")),
            ]),
            script: out("script.sh"),
            command: String::new(),
            timeout: 900,
        }
    }

    #[test]
    fn sorts_jobs_into_good_and_bad_lists() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(tmp.path());
        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let ok = job(&out, "exp-ok");
        let failed = job(&out, "exp-failed");
        let empty = job(&out, "exp-empty");
        let never = job(&out, "exp-never");

        fs::write(ok.output("am").unwrap(), b"").unwrap();
        let status = JobStatus {
            exit_status: 0,
            host: "node1".into(),
            start_time: "2026-10-18T00:00:00+00:00".into(),
            end_time: "2026-10-18T00:01:00+00:00".into(),
            job: ok.clone(),
        };
        fs::write(ok.output("stat").unwrap(), serde_yaml::to_string(&status).unwrap()).unwrap();
        fs::write(failed.output("status").unwrap(), "2\n").unwrap();
        fs::write(empty.output("status").unwrap(), "0\n").unwrap();

        let config = run_config(RunType::Am, "am001i", "i");
        let manifest = JobManifest {
            run: config.run.clone(),
            module: "am".into(),
            generated_at: "2026-10-18T00:00:00+00:00".into(),
            jobs: vec![ok, failed, empty, never],
        };
        let manifest_path = settings.paths.desdata.join("am/am001i/am001i-jobs.json");
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();

        let ctx = AppContext::new(
            settings,
            FakeFileLists::default(),
            FakeRowCounts::new(),
            MemoryRunConfigStore::new().with(config),
            RecordingRunner::new(0),
            TemplateEngine::new().unwrap(),
        );
        let outcome = execute(&ctx, &RunId::new("am001i").unwrap()).unwrap();
        assert_eq!(
            (outcome.good, outcome.failed, outcome.missing_outputs, outcome.no_status),
            (1, 1, 1, 1)
        );
        assert_eq!(outcome.bad(), 3);
        assert!(outcome.goodlist.ends_with("am/am001i/collated/am001i-goodlist.json"));

        let bad: Vec<CheckedJob> =
            serde_json::from_str(&fs::read_to_string(&outcome.badlist).unwrap()).unwrap();
        let outcomes: Vec<&JobOutcome> = bad.iter().map(|c| &c.outcome).collect();
        assert!(outcomes.contains(&&JobOutcome::Failed(2)));
        assert!(outcomes.contains(&&JobOutcome::NoStatus));
        assert!(bad.iter().any(|c| c.job_name == "exp-empty"
            && matches!(c.outcome, JobOutcome::MissingOutputs(ref paths) if paths.len() == 1)));
    }

    #[test]
    fn missing_manifest_is_input_not_found() {
        let tmp = TempDir::new().unwrap();
        let ctx = AppContext::new(
            settings(tmp.path()),
            FakeFileLists::default(),
            FakeRowCounts::new(),
            MemoryRunConfigStore::new().with(run_config(RunType::Am, "am001i", "i")),
            RecordingRunner::new(0),
            TemplateEngine::new().unwrap(),
        );
        let err = execute(&ctx, &RunId::new("am001i").unwrap()).unwrap_err();
        assert!(matches!(err, AppError::InputNotFound(_)));
    }
}
