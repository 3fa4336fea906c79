use std::path::Path;

use crate::domain::AppError;

/// Port for counting the objects in a catalog.
pub trait RowCountSource {
    fn row_count(&self, catalog: &Path) -> Result<u64, AppError>;
}
