use std::io;

use thiserror::Error;

use super::chunks::ChunkError;
use super::naming::NamingError;
use super::run_config::RunConfigError;

/// Library-wide error type for wlpipe operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    RunConfig(#[from] RunConfigError),

    /// No module spec with this name.
    #[error("Module '{name}' not found. Available: {available}")]
    ModuleNotFound { name: String, available: String },

    /// An input a job depends on is absent.
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// Template rendering failed.
    #[error("Template error in {template}: {details}")]
    TemplateError { template: String, details: String },

    /// An external process could not be run.
    #[error("Failed to run '{command}': {details}")]
    ProcessFailed { command: String, details: String },

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn parse_error(what: impl Into<String>, details: impl ToString) -> Self {
        AppError::ParseError { what: what.into(), details: details.to_string() }
    }

    /// Provide an `io::ErrorKind`-like view for callers expecting legacy behavior.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::RunConfig(RunConfigError::NotFound { .. }) => io::ErrorKind::NotFound,
            AppError::RunConfig(RunConfigError::AlreadyExists(_)) => io::ErrorKind::AlreadyExists,
            AppError::Configuration(_)
            | AppError::Naming(_)
            | AppError::Chunk(_)
            | AppError::RunConfig(_)
            | AppError::ParseError { .. }
            | AppError::TomlParseError(_) => io::ErrorKind::InvalidInput,
            AppError::ModuleNotFound { .. } | AppError::InputNotFound(_) => {
                io::ErrorKind::NotFound
            }
            AppError::TemplateError { .. } | AppError::ProcessFailed { .. } => {
                io::ErrorKind::Other
            }
        }
    }
}
