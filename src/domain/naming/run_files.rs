//! Run-level products that are not tied to a single processing unit.

use std::path::PathBuf;

use super::{NamingError, PathResolver, ProcessingKind, normalize_extension};
use crate::domain::identifiers::validation::validate_identifier;
use crate::domain::identifiers::{FileClass, RunId};

impl PathResolver {
    /// `{run dir}/collated`
    pub fn collated_dir(&self, fileclass: &FileClass, run: &RunId) -> PathBuf {
        self.run_dir(fileclass, run).join("collated")
    }

    /// `{collated}/{run}-{objclass}.{ext}` with the extension normalized.
    pub fn collated_path(
        &self,
        fileclass: &FileClass,
        run: &RunId,
        objclass: &str,
        ext: &str,
    ) -> Result<PathBuf, NamingError> {
        if !validate_identifier(objclass, false) {
            return Err(NamingError::InvalidArgument(format!(
                "invalid object class '{}'",
                objclass
            )));
        }
        let ext = normalize_extension(ext)?;
        Ok(self.collated_dir(fileclass, run).join(format!("{}-{}.{}", run, objclass, ext)))
    }

    /// Cached file list for a run: `{run dir}/flists/{run}-{kind}-flist.json`.
    pub fn flist_cache_path(
        &self,
        fileclass: &FileClass,
        run: &RunId,
        kind: ProcessingKind,
    ) -> PathBuf {
        self.run_dir(fileclass, run)
            .join("flists")
            .join(format!("{}-{}-flist.json", run, kind.tag()))
    }

    /// Index of every job emitted for a run.
    pub fn manifest_path(&self, fileclass: &FileClass, run: &RunId) -> PathBuf {
        self.run_dir(fileclass, run).join(format!("{}-jobs.json", run))
    }
}
