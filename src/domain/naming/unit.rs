//! Processing units: the exposure/ccd or tile/band a job works on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{NamingError, ProcessingKind};
use crate::domain::identifiers::{Band, ExposureName, TileName};

/// CCD number within an exposure, always rendered with two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ccd(u8);

impl Ccd {
    /// Largest CCD number that still fits the two-digit rendering.
    pub const MAX: u32 = 99;

    pub fn new(number: u32) -> Result<Self, NamingError> {
        if number > Self::MAX {
            return Err(NamingError::InvalidUnit(format!(
                "ccd {} does not fit two digits",
                number
            )));
        }
        Ok(Self(number as u8))
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

impl FromStr for Ccd {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .parse::<u32>()
            .map_err(|_| NamingError::InvalidUnit(format!("ccd '{}' is not a number", s)))?;
        Ccd::new(number)
    }
}

impl fmt::Display for Ccd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Serialize for Ccd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for Ccd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ccd::new(n),
            Raw::Text(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// Loosely-typed unit description as it arrives from the command line or a
/// file list. Fields are checked only when converted for a processing kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSpec {
    pub exposure: Option<String>,
    pub ccd: Option<String>,
    pub tile: Option<String>,
    pub band: Option<String>,
}

impl UnitSpec {
    pub fn exposure(exposure: impl Into<String>, ccd: impl ToString) -> Self {
        Self { exposure: Some(exposure.into()), ccd: Some(ccd.to_string()), ..Self::default() }
    }

    pub fn tile(tile: impl Into<String>, band: impl Into<String>) -> Self {
        Self { tile: Some(tile.into()), band: Some(band.into()), ..Self::default() }
    }

    /// Validate the fields required by `kind`.
    pub fn to_unit(&self, kind: ProcessingKind) -> Result<ProcessingUnit, NamingError> {
        match kind {
            ProcessingKind::SingleEpoch => {
                let exposure = required(&self.exposure, "exposure name", kind)?;
                let ccd = required(&self.ccd, "ccd", kind)?;
                Ok(ProcessingUnit::Exposure {
                    exposure: ExposureName::new(exposure)?,
                    ccd: ccd.parse()?,
                })
            }
            ProcessingKind::MultiEpoch => {
                let tile = required(&self.tile, "tile name", kind)?;
                let band = required(&self.band, "band", kind)?;
                Ok(ProcessingUnit::Tile { tile: TileName::new(tile)?, band: Band::new(band)? })
            }
        }
    }
}

fn required<'a>(
    field: &'a Option<String>,
    what: &str,
    kind: ProcessingKind,
) -> Result<&'a str, NamingError> {
    field
        .as_deref()
        .ok_or_else(|| NamingError::InvalidUnit(format!("{} units need a {}", kind, what)))
}

/// A validated processing unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingUnit {
    Exposure { exposure: ExposureName, ccd: Ccd },
    Tile { tile: TileName, band: Band },
}

impl ProcessingUnit {
    pub fn kind(&self) -> ProcessingKind {
        match self {
            ProcessingUnit::Exposure { .. } => ProcessingKind::SingleEpoch,
            ProcessingUnit::Tile { .. } => ProcessingKind::MultiEpoch,
        }
    }

    /// Directory key: the exposure name for SE, the tile name for ME.
    pub fn primary_key(&self) -> &str {
        match self {
            ProcessingUnit::Exposure { exposure, .. } => exposure.as_str(),
            ProcessingUnit::Tile { tile, .. } => tile.as_str(),
        }
    }

    /// Basename segments identifying the unit, in naming order.
    pub fn name_segments(&self) -> [String; 2] {
        match self {
            ProcessingUnit::Exposure { exposure, ccd } => [exposure.to_string(), ccd.to_string()],
            ProcessingUnit::Tile { tile, band } => [tile.to_string(), band.to_string()],
        }
    }
}

impl fmt::Display for ProcessingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.name_segments();
        write!(f, "{}-{}", a, b)
    }
}

impl From<&ProcessingUnit> for UnitSpec {
    fn from(unit: &ProcessingUnit) -> Self {
        match unit {
            ProcessingUnit::Exposure { exposure, ccd } => {
                UnitSpec::exposure(exposure.as_str(), ccd)
            }
            ProcessingUnit::Tile { tile, band } => UnitSpec::tile(tile.as_str(), band.as_str()),
        }
    }
}
