//! Tool settings (`wlpipe.toml`): where data lives and how jobs are submitted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AppError;

/// Environment variables that override the file, and the paths they set.
pub const ENV_DESDATA: &str = "DESDATA";
pub const ENV_FILE_LISTS: &str = "DES_FILE_LISTS";
pub const ENV_RUNCONFIG_DIR: &str = "WLPIPE_RUNCONFIG_DIR";
pub const ENV_SUBMIT_ROOT: &str = "WLPIPE_SUBMIT_ROOT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Data root; pipeline outputs and inputs both live under it.
    #[serde(default = "default_desdata")]
    pub desdata: PathBuf,
    /// Defaults to `{desdata}/file_lists`.
    #[serde(default)]
    pub file_lists: Option<PathBuf>,
    /// Defaults to `{desdata}/wlpipe/runconfig`.
    #[serde(default)]
    pub runconfig_dir: Option<PathBuf>,
    /// Defaults to `{desdata}`.
    #[serde(default)]
    pub submit_root: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            desdata: default_desdata(),
            file_lists: None,
            runconfig_dir: None,
            submit_root: None,
        }
    }
}

impl PathSettings {
    pub fn desdata(&self) -> &Path {
        &self.desdata
    }

    pub fn file_lists(&self) -> PathBuf {
        self.file_lists.clone().unwrap_or_else(|| self.desdata.join("file_lists"))
    }

    pub fn runconfig_dir(&self) -> PathBuf {
        self.runconfig_dir
            .clone()
            .unwrap_or_else(|| self.desdata.join("wlpipe").join("runconfig"))
    }

    pub fn submit_root(&self) -> PathBuf {
        self.submit_root.clone().unwrap_or_else(|| self.desdata.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// PBS queue for per-job scripts.
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_wq_priority")]
    pub wq_priority: String,
    /// Comma separated WQ groups, e.g. `gen4,gen5`.
    #[serde(default)]
    pub wq_groups: Option<String>,
    #[serde(default)]
    pub condor_requirements: Option<String>,
    #[serde(default = "default_check_nodes")]
    pub check_nodes: u32,
    #[serde(default = "default_check_ppn")]
    pub check_ppn: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            queue: default_queue(),
            account: default_account(),
            wq_priority: default_wq_priority(),
            wq_groups: None,
            condor_requirements: None,
            check_nodes: default_check_nodes(),
            check_ppn: default_check_ppn(),
        }
    }
}

fn default_desdata() -> PathBuf {
    PathBuf::from("/astro/u/astrodat/data/DES")
}

fn default_queue() -> String {
    "serial".to_string()
}

fn default_account() -> String {
    "des".to_string()
}

fn default_wq_priority() -> String {
    "low".to_string()
}

fn default_check_nodes() -> u32 {
    8
}

fn default_check_ppn() -> u32 {
    8
}

impl Settings {
    /// Apply environment overrides; `env` looks up one variable.
    pub fn with_env_overrides<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            env(key).filter(|value| !value.trim().is_empty()).map(PathBuf::from)
        };

        if let Some(desdata) = lookup(ENV_DESDATA) {
            self.paths.desdata = desdata;
        }
        if let Some(dir) = lookup(ENV_FILE_LISTS) {
            self.paths.file_lists = Some(dir);
        }
        if let Some(dir) = lookup(ENV_RUNCONFIG_DIR) {
            self.paths.runconfig_dir = Some(dir);
        }
        if let Some(dir) = lookup(ENV_SUBMIT_ROOT) {
            self.paths.submit_root = Some(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.scheduler.check_nodes == 0 || self.scheduler.check_ppn == 0 {
            return Err(AppError::config_error("check_nodes and check_ppn must be positive"));
        }
        if self.scheduler.queue.trim().is_empty() {
            return Err(AppError::config_error("scheduler queue must not be empty"));
        }
        Ok(())
    }
}

/// Parse and validate settings from TOML content.
pub fn parse_settings_content(content: &str) -> Result<Settings, AppError> {
    let settings: Settings = toml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}
