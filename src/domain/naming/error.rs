use super::ProcessingKind;

/// Naming capability error.
///
/// All variants are caller errors: the resolver never retries and never
/// partially succeeds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("Unknown file type '{filetype}' for {kind} processing")]
    UnknownFileType { filetype: String, kind: ProcessingKind },

    #[error("Invalid processing unit: {0}")]
    InvalidUnit(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
