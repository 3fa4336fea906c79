use crate::domain::{AppError, Bands, CoaddInfo, RedInfo};

/// Port for the inputs a dataset is made of.
pub trait FileListSource {
    /// Reduced CCD images of `dataset` in any of `bands`.
    fn red_info(&self, dataset: &str, bands: &Bands) -> Result<Vec<RedInfo>, AppError>;

    /// Coadd tiles of `dataset`, each with its source list when `has_srclist` is set.
    fn coadd_info(&self, dataset: &str, has_srclist: bool) -> Result<Vec<CoaddInfo>, AppError>;
}
