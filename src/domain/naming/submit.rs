//! Where scheduler files land, rooted at the submit root.

use std::path::{Path, PathBuf};

use super::{Ccd, ProcessingUnit};
use crate::domain::chunks::Chunk;
use crate::domain::identifiers::RunId;
use crate::domain::scheduler::Scheduler;

const SE_SUBDIR: &str = "byccd";
const TILE_SUBDIR: &str = "bytile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitLayout {
    root: PathBuf,
}

impl SubmitLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{pbs|condor|wq}/{run}[/{subdir}]`
    pub fn dir(&self, scheduler: Scheduler, run: &RunId, subdir: Option<&str>) -> PathBuf {
        let dir = self.root.join(scheduler.dir_name()).join(run.as_str());
        match subdir {
            Some(sub) => dir.join(sub),
            None => dir,
        }
    }

    /// Per-job submit file. SE units go under `byccd/`.
    pub fn job_file(
        &self,
        scheduler: Scheduler,
        run: &RunId,
        unit: &ProcessingUnit,
        range: Option<&Chunk>,
    ) -> PathBuf {
        let (subdir, name) = match unit {
            ProcessingUnit::Exposure { exposure, ccd } => {
                (Some(SE_SUBDIR), se_job_name(exposure, None, Some(*ccd)))
            }
            ProcessingUnit::Tile { tile, band } => (None, me_job_name(tile, band, range)),
        };
        self.dir(scheduler, run, subdir).join(format!("{}.{}", name, scheduler.job_ext()))
    }

    pub fn minions_file(&self, run: &RunId) -> PathBuf {
        self.dir(Scheduler::Pbs, run, None).join(format!("{}-minions.pbs", run))
    }

    pub fn commands_file(&self, run: &RunId) -> PathBuf {
        self.dir(Scheduler::Pbs, run, None).join(format!("{}-commands.txt", run))
    }

    pub fn check_script(&self, scheduler: Scheduler, run: &RunId) -> PathBuf {
        self.dir(scheduler, run, None).join(format!("{}-check.sh", run))
    }

    pub fn condor_file(&self, run: &RunId) -> PathBuf {
        self.dir(Scheduler::Condor, run, None).join(format!("{}.condor", run))
    }

    pub fn tile_condor_file(&self, run: &RunId, tile: &str) -> PathBuf {
        self.dir(Scheduler::Condor, run, Some(TILE_SUBDIR)).join(format!("{}.condor", tile))
    }
}

/// `{expname}[-{type}][-{ccd:02}]`
pub fn se_job_name(expname: &str, typ: Option<&str>, ccd: Option<Ccd>) -> String {
    let mut parts = vec![expname.to_string()];
    if let Some(typ) = typ {
        parts.push(typ.to_string());
    }
    if let Some(ccd) = ccd {
        parts.push(ccd.to_string());
    }
    parts.join("-")
}

/// `{tile}-{band}[-{start:06}-{end:06}]`
pub fn me_job_name(tile: &str, band: &str, range: Option<&Chunk>) -> String {
    match range {
        Some(chunk) => format!("{}-{}-{}", tile, band, chunk.label()),
        None => format!("{}-{}", tile, band),
    }
}
