//! Describe the built-in modules.

use serde::Serialize;

use crate::domain::module_spec::Timing;
use crate::domain::{ModuleSpec, builtin_modules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub kind: String,
    pub filetypes: Vec<String>,
    pub timing: String,
    pub uses_detband: bool,
}

impl From<&ModuleSpec> for ModuleSummary {
    fn from(module: &ModuleSpec) -> Self {
        let timing = match module.timing {
            Timing::PerJob { seconds, timeout } => {
                format!("{}s per job, timeout {}s", seconds, timeout)
            }
            Timing::PerObject { seconds } => format!("{}s per object", seconds),
        };
        Self {
            name: module.name.to_string(),
            kind: module.kind.tag().to_string(),
            filetypes: module
                .filetypes
                .iter()
                .map(|f| format!("{}.{}", f.key, f.ext))
                .collect(),
            timing,
            uses_detband: module.uses_detband,
        }
    }
}

pub fn execute() -> Vec<ModuleSummary> {
    builtin_modules().iter().map(ModuleSummary::from).collect()
}
