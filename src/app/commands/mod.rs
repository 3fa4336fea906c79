//! Command implementations behind the CLI.
//!
//! Each command takes typed options and returns an outcome; printing is left
//! to `app::cli`.

pub mod check;
pub mod generate;
pub mod modules;
pub mod path;
pub mod process;
pub mod runconfig;

use crate::domain::{AppError, ModuleSpec, builtin_modules, find_module};

/// Look up a built-in module by name.
pub(crate) fn module_named(name: &str) -> Result<ModuleSpec, AppError> {
    find_module(name).ok_or_else(|| AppError::ModuleNotFound {
        name: name.to_string(),
        available: builtin_modules().iter().map(|m| m.name).collect::<Vec<_>>().join(", "),
    })
}
