use crate::domain::{AppError, RunConfig, RunId};

/// Port for stored run configurations.
pub trait RunConfigStore {
    fn exists(&self, run: &RunId) -> bool;

    fn load(&self, run: &RunId) -> Result<RunConfig, AppError>;

    /// Store a new configuration. Refuses to replace an existing one.
    fn save(&self, config: &RunConfig) -> Result<(), AppError>;
}
