use std::sync::Mutex;

use crate::domain::{AppError, Bands, CoaddInfo, RedInfo};
use crate::ports::FileListSource;

/// In-memory file lists that count how often they are queried.
#[derive(Default)]
pub struct FakeFileLists {
    pub red: Vec<RedInfo>,
    pub coadd: Vec<CoaddInfo>,
    pub red_calls: Mutex<usize>,
    pub coadd_calls: Mutex<usize>,
}

impl FakeFileLists {
    pub fn new(red: Vec<RedInfo>, coadd: Vec<CoaddInfo>) -> Self {
        Self { red, coadd, ..Self::default() }
    }

    pub fn red_calls(&self) -> usize {
        *self.red_calls.lock().unwrap()
    }

    pub fn coadd_calls(&self) -> usize {
        *self.coadd_calls.lock().unwrap()
    }
}

impl FileListSource for FakeFileLists {
    fn red_info(&self, _dataset: &str, bands: &Bands) -> Result<Vec<RedInfo>, AppError> {
        *self.red_calls.lock().unwrap() += 1;
        Ok(self
            .red
            .iter()
            .filter(|info| info.band.as_ref().is_none_or(|band| bands.contains(band)))
            .cloned()
            .collect())
    }

    fn coadd_info(&self, _dataset: &str, has_srclist: bool) -> Result<Vec<CoaddInfo>, AppError> {
        *self.coadd_calls.lock().unwrap() += 1;
        Ok(self
            .coadd
            .iter()
            .cloned()
            .map(|mut info| {
                if !has_srclist {
                    info.srclist.clear();
                }
                info
            })
            .collect())
    }
}
