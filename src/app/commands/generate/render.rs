//! Scheduler text for a set of job records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::adapters::TemplateEngine;
use crate::domain::walltime::{job_walltime, minions_walltime};
use crate::domain::{
    AppError, JobRecord, ModuleSpec, ProcessingUnit, RunConfig, Scheduler, SchedulerSettings,
    SubmitLayout,
};

use super::RenderedFile;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct PbsJobContext<'a> {
    queue: &'a str,
    walltime: String,
    job_name: &'a str,
    pbslog: String,
    account: &'a str,
    version: &'a str,
    commands: &'a str,
    log: &'a str,
    status: &'a str,
    timeout: u64,
}

#[derive(Serialize)]
struct MinionsContext<'a> {
    job_name: String,
    nodes: u32,
    ppn: u32,
    ncpu: u32,
    walltime: String,
    queue: &'a str,
    account: &'a str,
    minions_file: String,
    commands_file: String,
}

#[derive(Serialize)]
struct CondorJob<'a> {
    job_name: &'a str,
    script: &'a str,
}

#[derive(Serialize)]
struct CondorContext<'a> {
    requirements: Option<&'a str>,
    jobs: Vec<CondorJob<'a>>,
}

#[derive(Serialize)]
struct WqContext<'a> {
    script: &'a str,
    job_name: &'a str,
    priority: &'a str,
    group: Option<&'a str>,
}

#[derive(Serialize)]
struct CheckContext<'a> {
    run: &'a str,
    njobs: usize,
    paths: Vec<&'a str>,
}

fn required_output<'j>(job: &'j JobRecord, key: &str) -> Result<&'j str, AppError> {
    job.output_files.get(key).map(String::as_str).ok_or_else(|| {
        AppError::config_error(format!("job {} has no {} output", job.job_name, key))
    })
}

/// Renders job and scheduler files for one run.
pub struct Renderer<'a> {
    templates: &'a TemplateEngine,
    settings: &'a SchedulerSettings,
    config: &'a RunConfig,
    module: &'a ModuleSpec,
    layout: &'a SubmitLayout,
}

impl<'a> Renderer<'a> {
    pub fn new(
        templates: &'a TemplateEngine,
        settings: &'a SchedulerSettings,
        config: &'a RunConfig,
        module: &'a ModuleSpec,
        layout: &'a SubmitLayout,
    ) -> Self {
        Self { templates, settings, config, module, layout }
    }

    fn queue(&self) -> &str {
        self.config.queue.as_deref().unwrap_or(&self.settings.queue)
    }

    fn seconds_per_job(&self) -> Result<u64, AppError> {
        self.module.seconds_per_job(self.config.nper).ok_or_else(|| {
            AppError::config_error(format!(
                "module {} times jobs per object; run {} needs nper",
                self.module.name, self.config.run
            ))
        })
    }

    /// The job's script and its meta JSON.
    pub fn job_files(&self, job: &JobRecord) -> Result<Vec<RenderedFile>, AppError> {
        let walltime = job_walltime(self.seconds_per_job()?, self.module.walltime_hours);
        let context = PbsJobContext {
            queue: self.queue(),
            walltime: walltime.to_string(),
            job_name: &job.job_name,
            pbslog: format!("{}.pbslog", job.script),
            account: &self.settings.account,
            version: VERSION,
            commands: &job.command,
            log: required_output(job, "log")?,
            status: required_output(job, "status")?,
            timeout: job.timeout,
        };
        let script = RenderedFile {
            path: job.script.clone().into(),
            content: self.templates.render("pbs_job.sh.j2", &context)?,
            executable: true,
        };

        let mut meta = serde_json::to_string_pretty(job)
            .map_err(|e| AppError::parse_error("job record", e))?;
        meta.push('\n');
        let meta = RenderedFile {
            path: required_output(job, "meta")?.into(),
            content: meta,
            executable: false,
        };

        Ok(vec![script, meta])
    }

    /// Run-level and per-job submit files for `scheduler`, plus the check script.
    pub fn scheduler_files(
        &self,
        scheduler: Scheduler,
        jobs: &[&JobRecord],
    ) -> Result<Vec<RenderedFile>, AppError> {
        let mut files = match scheduler {
            Scheduler::Pbs => self.minions_files(jobs)?,
            Scheduler::Condor => self.condor_files(jobs)?,
            Scheduler::Wq => self.wq_files(jobs)?,
        };
        files.push(self.check_script(scheduler, jobs)?);
        Ok(files)
    }

    /// Commands file and minions batch, when the run asks for a batch.
    fn minions_files(&self, jobs: &[&JobRecord]) -> Result<Vec<RenderedFile>, AppError> {
        let (Some(ppn), Some(nodes), Some(ncpu)) =
            (self.config.ppn, self.config.nodes, self.config.ncpu())
        else {
            return Ok(Vec::new());
        };
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let run = &self.config.run;
        let commands_file = self.layout.commands_file(run);
        let minions_file = self.layout.minions_file(run);

        let scripts: Vec<&str> = jobs.iter().map(|job| job.script.as_str()).collect();
        let commands = self
            .templates
            .render("commands.txt.j2", minijinja::context! { scripts => scripts })?;

        let walltime =
            minions_walltime(self.seconds_per_job()?, jobs.len() as u64, u64::from(ncpu));
        let context = MinionsContext {
            job_name: format!("{}-minions", run),
            nodes,
            ppn,
            ncpu,
            walltime: walltime.to_string(),
            queue: self.queue(),
            account: &self.settings.account,
            minions_file: minions_file.to_string_lossy().into_owned(),
            commands_file: commands_file.to_string_lossy().into_owned(),
        };
        let minions = self.templates.render("minions.pbs.j2", &context)?;

        Ok(vec![
            RenderedFile { path: commands_file, content: commands, executable: false },
            RenderedFile { path: minions_file, content: minions, executable: false },
        ])
    }

    /// One run-level submit file; tile runs also get one per tile.
    fn condor_files(&self, jobs: &[&JobRecord]) -> Result<Vec<RenderedFile>, AppError> {
        let run = &self.config.run;
        let mut files = vec![RenderedFile {
            path: self.layout.condor_file(run),
            content: self.condor_submit(jobs)?,
            executable: false,
        }];

        let mut by_tile: BTreeMap<&str, Vec<&JobRecord>> = BTreeMap::new();
        for job in jobs {
            if let ProcessingUnit::Tile { tile, .. } = &job.unit {
                by_tile.entry(tile.as_str()).or_default().push(job);
            }
        }
        for (tile, tile_jobs) in by_tile {
            files.push(RenderedFile {
                path: self.layout.tile_condor_file(run, tile),
                content: self.condor_submit(&tile_jobs)?,
                executable: false,
            });
        }
        Ok(files)
    }

    fn condor_submit(&self, jobs: &[&JobRecord]) -> Result<String, AppError> {
        let context = CondorContext {
            requirements: self.settings.condor_requirements.as_deref(),
            jobs: jobs
                .iter()
                .map(|job| CondorJob { job_name: &job.job_name, script: &job.script })
                .collect(),
        };
        self.templates.render("submit.condor.j2", &context)
    }

    fn wq_files(&self, jobs: &[&JobRecord]) -> Result<Vec<RenderedFile>, AppError> {
        jobs.iter()
            .map(|job| {
                let context = WqContext {
                    script: &job.script,
                    job_name: &job.job_name,
                    priority: &self.settings.wq_priority,
                    group: self.settings.wq_groups.as_deref(),
                };
                Ok(RenderedFile {
                    path: self.layout.job_file(
                        Scheduler::Wq,
                        &self.config.run,
                        &job.unit,
                        job.range.as_ref(),
                    ),
                    content: self.templates.render("wq_job.yaml.j2", &context)?,
                    executable: false,
                })
            })
            .collect()
    }

    /// Script listing every expected output that is absent.
    fn check_script(
        &self,
        scheduler: Scheduler,
        jobs: &[&JobRecord],
    ) -> Result<RenderedFile, AppError> {
        let context = CheckContext {
            run: self.config.run.as_str(),
            njobs: jobs.len(),
            paths: jobs
                .iter()
                .flat_map(|job| job.output_files.values().map(String::as_str))
                .collect(),
        };
        Ok(RenderedFile {
            path: self.layout.check_script(scheduler, &self.config.run),
            content: self.templates.render("check.sh.j2", &context)?,
            executable: true,
        })
    }
}
