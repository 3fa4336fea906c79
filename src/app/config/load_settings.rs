use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::settings::parse_settings_content;
use crate::domain::{AppError, Settings};

/// Names the settings file when `--config` is not given.
pub const CONFIG_ENV: &str = "WLPIPE_CONFIG";

/// Load settings from `--config`, `$WLPIPE_CONFIG` or defaults, then apply
/// environment overrides from the process environment.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, AppError> {
    load_settings_with(explicit, |key| std::env::var(key).ok())
}

/// As [`load_settings`], reading the environment through `env`.
pub fn load_settings_with<F>(explicit: Option<&Path>, env: F) -> Result<Settings, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let path: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(|| env(CONFIG_ENV).filter(|p| !p.trim().is_empty()).map(PathBuf::from));

    let settings = match path {
        Some(path) => {
            let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AppError::config_error(format!(
                    "Settings file not found: {}",
                    path.display()
                )),
                _ => AppError::from(e),
            })?;
            tracing::debug!(path = %path.display(), "loaded settings");
            parse_settings_content(&content)?
        }
        None => Settings::default(),
    };

    Ok(settings.with_env_overrides(env))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    fn env_from(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("a.toml");
        let from_env = tmp.path().join("b.toml");
        fs::write(&explicit, "[scheduler]\nqueue = \"explicit\"\n").unwrap();
        fs::write(&from_env, "[scheduler]\nqueue = \"env\"\n").unwrap();

        let env = env_from(&[(CONFIG_ENV, from_env.display().to_string())]);
        let settings = load_settings_with(Some(&explicit), &env).unwrap();
        assert_eq!(settings.scheduler.queue, "explicit");

        let settings = load_settings_with(None, &env).unwrap();
        assert_eq!(settings.scheduler.queue, "env");
    }

    #[test]
    fn no_file_means_defaults_plus_overrides() {
        let env = env_from(&[("DESDATA", "/scratch/des".to_string())]);
        let settings = load_settings_with(None, env).unwrap();
        assert_eq!(settings.paths.desdata, PathBuf::from("/scratch/des"));
        assert_eq!(settings.scheduler.queue, "serial");
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = load_settings_with(Some(&missing), |_| None).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("nope.toml"));
    }

    struct EnvVarGuard {
        key: &'static str,
        original: Option<std::ffi::OsString>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
            let original = std::env::var_os(key);
            unsafe { std::env::set_var(key, value) };
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_ref() {
                Some(original) => unsafe { std::env::set_var(self.key, original) },
                None => unsafe { std::env::remove_var(self.key) },
            }
        }
    }

    #[test]
    #[serial]
    fn process_environment_is_read() {
        use assert_fs::prelude::*;

        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("wlpipe.toml");
        file.write_str("[paths]\ndesdata = \"/from/file\"\n").unwrap();

        let _config = EnvVarGuard::set(CONFIG_ENV, file.path());
        let _submit = EnvVarGuard::set("WLPIPE_SUBMIT_ROOT", "/scratch/submit");
        let _desdata = EnvVarGuard::set("DESDATA", "");
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.paths.desdata, PathBuf::from("/from/file"));
        assert_eq!(settings.paths.submit_root(), PathBuf::from("/scratch/submit"));
    }
}
