//! `FileListSource` over flat JSON exports of the file database.
//!
//! Layout under the file-list root:
//!
//! ```text
//! {dataset}/{dataset}-red-info.json       reduced CCD images
//! {dataset}/{dataset}-coadd-info.json     coadd tiles
//! {dataset}/{dataset}-coadd-srclist.json  coadd tiles with their source lists
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::domain::{AppError, Bands, CoaddInfo, RedInfo};
use crate::ports::FileListSource;

#[derive(Debug, Clone)]
pub struct JsonFileListSource {
    root: PathBuf,
}

impl JsonFileListSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn list_path(&self, dataset: &str, what: &str) -> PathBuf {
        self.root.join(dataset).join(format!("{}-{}.json", dataset, what))
    }

    fn read_list<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, AppError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::InputNotFound(format!("file list {}", path.display()))
            }
            _ => AppError::from(e),
        })?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::parse_error(path.display().to_string(), e))
    }
}

impl FileListSource for JsonFileListSource {
    fn red_info(&self, dataset: &str, bands: &Bands) -> Result<Vec<RedInfo>, AppError> {
        let path = self.list_path(dataset, "red-info");
        let mut infos: Vec<RedInfo> = self.read_list(&path)?;
        infos.retain(|info| info.band.as_ref().is_none_or(|band| bands.contains(band)));
        infos.sort_by(|a, b| (&a.expname, a.ccd).cmp(&(&b.expname, b.ccd)));
        tracing::debug!(dataset, count = infos.len(), "read red info");
        Ok(infos)
    }

    fn coadd_info(&self, dataset: &str, has_srclist: bool) -> Result<Vec<CoaddInfo>, AppError> {
        let what = if has_srclist { "coadd-srclist" } else { "coadd-info" };
        let path = self.list_path(dataset, what);
        let infos: Vec<CoaddInfo> = self.read_list(&path)?;
        tracing::debug!(dataset, has_srclist, count = infos.len(), "read coadd info");
        Ok(infos)
    }
}
