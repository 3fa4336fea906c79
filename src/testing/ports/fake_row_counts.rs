use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::RowCountSource;

/// Row counts keyed by catalog path.
#[derive(Default)]
pub struct FakeRowCounts {
    rows: HashMap<PathBuf, u64>,
}

impl FakeRowCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, catalog: impl Into<PathBuf>, rows: u64) -> Self {
        self.rows.insert(catalog.into(), rows);
        self
    }
}

impl RowCountSource for FakeRowCounts {
    fn row_count(&self, catalog: &Path) -> Result<u64, AppError> {
        self.rows
            .get(catalog)
            .copied()
            .ok_or_else(|| AppError::InputNotFound(format!("catalog {}", catalog.display())))
    }
}
