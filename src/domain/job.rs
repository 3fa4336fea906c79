//! Job records: everything one scheduler job needs, and the run-level index.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::chunks::Chunk;
use super::identifiers::RunId;
use super::naming::ProcessingUnit;

/// Output keys every job writes besides its module products.
pub const SUPPORT_OUTPUTS: [&str; 4] = ["log", "meta", "status", "stat"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub run: RunId,
    pub module: String,
    pub unit: ProcessingUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Chunk>,
    pub job_name: String,
    pub input_files: BTreeMap<String, String>,
    pub output_files: BTreeMap<String, String>,
    pub script: String,
    pub command: String,
    /// Seconds before the command is killed.
    pub timeout: u64,
}

impl JobRecord {
    pub fn output(&self, key: &str) -> Option<&Path> {
        self.output_files.get(key).map(Path::new)
    }

    /// Module products, i.e. outputs other than the support files.
    pub fn product_outputs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.output_files
            .iter()
            .filter(|(key, _)| !SUPPORT_OUTPUTS.contains(&key.as_str()))
            .map(|(key, path)| (key.as_str(), path.as_str()))
    }

    /// Product paths that do not exist on disk.
    pub fn missing_products(&self) -> Vec<String> {
        self.product_outputs()
            .filter(|(_, path)| !Path::new(path).exists())
            .map(|(_, path)| path.to_string())
            .collect()
    }

    pub fn nobj(&self) -> Option<u64> {
        self.range.map(|chunk| chunk.len())
    }
}

/// Every job generated for a run, stored at the run's manifest path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobManifest {
    pub run: RunId,
    pub module: String,
    pub generated_at: String,
    pub jobs: Vec<JobRecord>,
}
