//! Run configurations stored as `{dir}/{run}-config.json`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::domain::{AppError, RunConfig, RunConfigError, RunId};
use crate::ports::RunConfigStore;

#[derive(Debug, Clone)]
pub struct FilesystemRunConfigStore {
    dir: PathBuf,
}

impl FilesystemRunConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_path(&self, run: &RunId) -> PathBuf {
        self.dir.join(format!("{}-config.json", run))
    }
}

impl RunConfigStore for FilesystemRunConfigStore {
    fn exists(&self, run: &RunId) -> bool {
        self.config_path(run).exists()
    }

    fn load(&self, run: &RunId) -> Result<RunConfig, AppError> {
        let path = self.config_path(run);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                let run = run.to_string();
                AppError::from(RunConfigError::NotFound { run, path: path.clone() })
            }
            _ => AppError::from(e),
        })?;

        let malformed = |details: String| RunConfigError::Malformed {
            path: path.display().to_string(),
            details,
        };
        let config: RunConfig =
            serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?;
        if &config.run != run {
            return Err(malformed(format!("names run '{}'", config.run)).into());
        }
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &RunConfig) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.config_path(&config.run);

        let mut file = OpenOptions::new().write(true).create_new(true).open(&path).map_err(
            |e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    AppError::from(RunConfigError::AlreadyExists(config.run.to_string()))
                }
                _ => AppError::from(e),
            },
        )?;

        let mut content = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::parse_error("run config", e))?;
        content.push('\n');
        file.write_all(content.as_bytes())?;
        tracing::info!(run = %config.run, path = %path.display(), "wrote run config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Band, Bands, RunConfigRequest, RunType};

    fn config(run: &str) -> RunConfig {
        let mut request = RunConfigRequest::new(
            RunType::Am,
            "sva1",
            Bands::single(Band::new("i").unwrap()),
        );
        request.comment = Some("first pass".into());
        request.build(RunId::new(run).unwrap(), |key| Some(format!("{}-1", key))).unwrap()
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = FilesystemRunConfigStore::new(tmp.path());
        let config = config("am001i");

        assert!(!store.exists(&config.run));
        store.save(&config).unwrap();
        assert!(store.exists(&config.run));
        assert_eq!(store.load(&config.run).unwrap(), config);
    }

    #[test]
    fn save_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let store = FilesystemRunConfigStore::new(tmp.path());
        store.save(&config("am001i")).unwrap();
        let err = store.save(&config("am001i")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = FilesystemRunConfigStore::new(tmp.path());
        let err = store.load(&RunId::new("am009i").unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("am009i-config.json"));
    }

    #[test]
    fn load_rejects_mismatched_run() {
        let tmp = TempDir::new().unwrap();
        let store = FilesystemRunConfigStore::new(tmp.path());
        store.save(&config("am001i")).unwrap();
        fs::copy(tmp.path().join("am001i-config.json"), tmp.path().join("am002i-config.json"))
            .unwrap();
        let err = store.load(&RunId::new("am002i").unwrap()).unwrap_err();
        assert!(matches!(err, AppError::RunConfig(RunConfigError::Malformed { .. })));
    }
}
