//! Shared testing utilities for wlpipe CLI tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const VERSION_KEYS: [&str; 5] =
    ["DESWL_VERS", "DESDB_VERS", "ESUTIL_VERS", "ADMOM_VERS", "ESPY_VERS"];

/// Isolated data root, submit root and settings file for CLI exercises.
pub struct TestContext {
    root: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let settings = format!(
            r#"[paths]
desdata = "{root}/DES"
file_lists = "{root}/file_lists"
runconfig_dir = "{root}/runconfig"
submit_root = "{root}/submit"

[scheduler]
queue = "serial"
"#,
            root = root.path().display()
        );
        fs::write(root.path().join("wlpipe.toml"), settings).expect("Failed to write settings");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn desdata(&self) -> PathBuf {
        self.root().join("DES")
    }

    pub fn submit(&self) -> PathBuf {
        self.root().join("submit")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root().join("wlpipe.toml")
    }

    /// Command for the compiled binary, reading this context's settings.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("wlpipe").expect("Failed to locate wlpipe binary");
        cmd.current_dir(self.root())
            .env("WLPIPE_CONFIG", self.settings_path())
            .env_remove("DESDATA")
            .env_remove("DES_FILE_LISTS")
            .env_remove("WLPIPE_RUNCONFIG_DIR")
            .env_remove("WLPIPE_SUBMIT_ROOT")
            .env_remove("RUST_LOG");
        for key in VERSION_KEYS {
            cmd.env(key, format!("{}-v1", key.to_lowercase()));
        }
        cmd
    }

    /// Write `{file_lists}/{dataset}/{dataset}-red-info.json`.
    pub fn write_red_info(&self, dataset: &str, ccds: &[(&str, u32)]) {
        let infos: Vec<Value> = ccds
            .iter()
            .map(|(exp, ccd)| {
                json!({
                    "expname": exp,
                    "ccd": ccd,
                    "band": "i",
                    "image_url": format!("/data/red/{exp}/{exp}_{ccd:02}.fits.fz"),
                })
            })
            .collect();
        let dir = self.root().join("file_lists").join(dataset);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{}-red-info.json", dataset)),
            serde_json::to_string_pretty(&infos).unwrap(),
        )
        .unwrap();
    }

    /// Create an `am` run over the given dataset and return its name.
    pub fn create_am_run(&self, dataset: &str) -> String {
        let output = self
            .cli()
            .args(["runconfig", "new", "am", "--dataset", dataset, "--band", "i"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        "am001i".to_string()
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(path.as_ref())
            .unwrap_or_else(|e| panic!("reading {}: {}", path.as_ref().display(), e))
    }

    pub fn read_json(&self, path: impl AsRef<Path>) -> Value {
        serde_json::from_str(&self.read(path)).unwrap()
    }
}
