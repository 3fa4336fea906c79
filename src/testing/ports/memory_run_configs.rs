use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::{AppError, RunConfig, RunConfigError, RunId};
use crate::ports::RunConfigStore;

#[derive(Default)]
pub struct MemoryRunConfigStore {
    configs: Mutex<BTreeMap<String, RunConfig>>,
}

impl MemoryRunConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, config: RunConfig) -> Self {
        self.configs.lock().unwrap().insert(config.run.to_string(), config);
        self
    }

    pub fn runs(&self) -> Vec<String> {
        self.configs.lock().unwrap().keys().cloned().collect()
    }
}

impl RunConfigStore for MemoryRunConfigStore {
    fn exists(&self, run: &RunId) -> bool {
        self.configs.lock().unwrap().contains_key(run.as_str())
    }

    fn load(&self, run: &RunId) -> Result<RunConfig, AppError> {
        self.configs.lock().unwrap().get(run.as_str()).cloned().ok_or_else(|| {
            RunConfigError::NotFound {
                run: run.to_string(),
                path: format!("memory://{}", run).into(),
            }
            .into()
        })
    }

    fn save(&self, config: &RunConfig) -> Result<(), AppError> {
        let mut configs = self.configs.lock().unwrap();
        if configs.contains_key(config.run.as_str()) {
            return Err(RunConfigError::AlreadyExists(config.run.to_string()).into());
        }
        configs.insert(config.run.to_string(), config.clone());
        Ok(())
    }
}
