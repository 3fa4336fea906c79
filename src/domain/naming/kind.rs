use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NamingError;

/// Processing granularity that decides how a unit is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProcessingKind {
    /// Single-epoch: one exposure and one CCD.
    #[serde(rename = "SE")]
    SingleEpoch,
    /// Multi-epoch: one coadd tile and one band.
    #[serde(rename = "ME")]
    MultiEpoch,
}

impl ProcessingKind {
    pub const ALL: [ProcessingKind; 2] = [ProcessingKind::SingleEpoch, ProcessingKind::MultiEpoch];

    /// Short tag used in file names and CLI flags.
    pub fn tag(&self) -> &'static str {
        match self {
            ProcessingKind::SingleEpoch => "se",
            ProcessingKind::MultiEpoch => "me",
        }
    }
}

impl fmt::Display for ProcessingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingKind::SingleEpoch => write!(f, "SE"),
            ProcessingKind::MultiEpoch => write!(f, "ME"),
        }
    }
}

impl FromStr for ProcessingKind {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "se" | "single-epoch" => Ok(ProcessingKind::SingleEpoch),
            "me" | "multi-epoch" => Ok(ProcessingKind::MultiEpoch),
            _ => Err(NamingError::InvalidArgument(format!(
                "unknown processing kind '{}': expected SE or ME",
                s
            ))),
        }
    }
}
