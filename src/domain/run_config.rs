//! Run configuration: the per-campaign record naming, dataset and software
//! versions hang off.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::identifiers::{Band, FileClass, RunId};
use super::naming::ProcessingKind;

/// Versions every run records, whatever its type.
pub const BASE_ENV_KEYS: [&str; 3] = ["DESWL_VERS", "DESDB_VERS", "ESUTIL_VERS"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunConfigError {
    #[error("Run config for '{run}' not found: {}", .path.display())]
    NotFound { run: String, path: PathBuf },

    #[error("Malformed run config {path}: {details}")]
    Malformed { path: String, details: String },

    #[error("Unknown run type '{0}': must be one of {names}", names = RunType::names())]
    UnknownRunType(String),

    #[error("Run type '{run_type}' requires '{field}'")]
    MissingField { run_type: RunType, field: &'static str },

    #[error("Environment variable {0} must be set")]
    MissingEnvironment(String),

    #[error("Run config for '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid run config: {0}")]
    Invalid(String),
}

/// External code a run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    Sse,
    Sme,
    Am,
    Impyp,
    Eyeball,
    Im3shape,
    GmixFitMeds,
    GmixMcmcMeds,
}

impl RunType {
    pub const ALL: [RunType; 8] = [
        RunType::Sse,
        RunType::Sme,
        RunType::Am,
        RunType::Impyp,
        RunType::Eyeball,
        RunType::Im3shape,
        RunType::GmixFitMeds,
        RunType::GmixMcmcMeds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunType::Sse => "sse",
            RunType::Sme => "sme",
            RunType::Am => "am",
            RunType::Impyp => "impyp",
            RunType::Eyeball => "eyeball",
            RunType::Im3shape => "im3shape",
            RunType::GmixFitMeds => "gmix_fit_meds",
            RunType::GmixMcmcMeds => "gmix_mcmc_meds",
        }
    }

    fn names() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }

    pub fn fileclass(&self) -> &'static str {
        match self {
            RunType::Sse | RunType::Sme => "shapelets",
            RunType::Am => "am",
            RunType::Impyp => "impyp",
            RunType::Eyeball | RunType::Im3shape | RunType::GmixFitMeds | RunType::GmixMcmcMeds => {
                FileClass::WLPIPE
            }
        }
    }

    pub fn kind(&self) -> ProcessingKind {
        match self {
            RunType::Sse | RunType::Am | RunType::Impyp | RunType::Eyeball => {
                ProcessingKind::SingleEpoch
            }
            RunType::Sme | RunType::Im3shape | RunType::GmixFitMeds | RunType::GmixMcmcMeds => {
                ProcessingKind::MultiEpoch
            }
        }
    }

    /// Name of the module spec this run type drives.
    pub fn module_name(&self) -> &'static str {
        match self {
            RunType::Sse => "shapelets",
            RunType::Sme => "multishear",
            other => other.as_str(),
        }
    }

    /// Environment keys recorded on top of [`BASE_ENV_KEYS`].
    pub fn extra_env_keys(&self) -> &'static [&'static str] {
        match self {
            RunType::Sse | RunType::Sme => &["TMV_VERS", "SHAPELETS_VERS"],
            RunType::Am => &["ADMOM_VERS", "ESPY_VERS"],
            RunType::Impyp => &["IMPYP_VERS"],
            RunType::Eyeball => &["EYEBALLER_VERS"],
            RunType::Im3shape => &["IM3SHAPE_VERS"],
            RunType::GmixFitMeds | RunType::GmixMcmcMeds => &["GMIX_MEDS_VERS"],
        }
    }

    pub fn required_env_keys(&self) -> Vec<&'static str> {
        BASE_ENV_KEYS.iter().chain(self.extra_env_keys()).copied().collect()
    }

    fn needs_serun(&self) -> bool {
        matches!(self, RunType::Sme | RunType::Impyp)
    }

    fn needs_wl_config(&self) -> bool {
        matches!(self, RunType::Sse | RunType::Sme)
    }

    fn needs_medsconf(&self) -> bool {
        matches!(self, RunType::GmixFitMeds | RunType::GmixMcmcMeds)
    }

    /// First run number tried when naming a new run.
    pub fn start_number(&self, test: bool) -> u32 {
        match (self, test) {
            (RunType::Sse, true) => 13,
            (RunType::Sme, true) => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = RunConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RunConfigError::UnknownRunType(s.to_string()))
    }
}

/// Non-empty ordered list of bands.
///
/// Accepts a scalar or a list on input; a single band serializes as a scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bands(Vec<Band>);

impl Bands {
    pub fn new(bands: Vec<Band>) -> Result<Self, RunConfigError> {
        if bands.is_empty() {
            return Err(RunConfigError::Invalid("band list is empty".to_string()));
        }
        Ok(Self(bands))
    }

    pub fn single(band: Band) -> Self {
        Self(vec![band])
    }

    /// The band that selects tiles and names the run.
    pub fn first(&self) -> &Band {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, band: &str) -> bool {
        self.0.iter().any(|b| b.as_str() == band)
    }
}

impl FromStr for Bands {
    type Err = RunConfigError;

    /// Comma separated, e.g. `g,r,i`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bands = s
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| Band::new(b).map_err(|e| RunConfigError::Invalid(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Bands::new(bands)
    }
}

impl fmt::Display for Bands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|b| b.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for Bands {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [one] => one.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Bands {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(Band),
            Many(Vec<Band>),
        }

        let bands = match Raw::deserialize(deserializer)? {
            Raw::One(band) => vec![band],
            Raw::Many(bands) => bands,
        };
        Bands::new(bands).map_err(serde::de::Error::custom)
    }
}

/// One run's configuration, stored as `{run}-config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunId,
    pub run_type: RunType,
    pub band: Bands,
    pub fileclass: FileClass,
    pub dataset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wl_config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serun: Option<RunId>,
    /// Objects per chunk for tile runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nper: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    /// Detection run whose outputs feed this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detrun: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detband: Option<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medsconf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Software versions and any other keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RunConfig {
    pub fn kind(&self) -> ProcessingKind {
        self.run_type.kind()
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        let missing = |field: &'static str| RunConfigError::MissingField {
            run_type: self.run_type,
            field,
        };

        if self.dataset.trim().is_empty() {
            return Err(missing("dataset"));
        }
        if self.run_type.needs_serun() && self.serun.is_none() {
            return Err(missing("serun"));
        }
        if self.run_type.needs_wl_config() && self.wl_config.is_none() {
            return Err(missing("wl_config"));
        }
        if self.run_type.needs_medsconf() && self.medsconf.is_none() {
            return Err(missing("medsconf"));
        }
        if self.nper == Some(0) {
            return Err(RunConfigError::Invalid("nper must be positive".to_string()));
        }
        if self.ppn.is_some() != self.nodes.is_some() {
            return Err(RunConfigError::Invalid("ppn and nodes must be set together".to_string()));
        }
        if self.detband.is_some() && self.detrun.is_none() {
            return Err(RunConfigError::Invalid("detband needs a detrun".to_string()));
        }
        Ok(())
    }

    /// Total CPUs of a minions batch, when the run asks for one.
    pub fn ncpu(&self) -> Option<u32> {
        Some(self.ppn? * self.nodes?)
    }

    /// A version recorded in the flattened keys.
    pub fn software_version(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Detection band when it differs from the run's own band.
    pub fn distinct_detband(&self) -> Option<&Band> {
        self.detband.as_ref().filter(|det| *det != self.band.first())
    }
}

/// Input for creating a new run configuration.
#[derive(Debug, Clone)]
pub struct RunConfigRequest {
    pub run_type: RunType,
    pub dataset: String,
    pub band: Bands,
    pub wl_config: Option<String>,
    pub serun: Option<RunId>,
    pub nper: Option<u64>,
    pub medsconf: Option<String>,
    pub detrun: Option<RunId>,
    pub detband: Option<Band>,
    pub comment: Option<String>,
}

impl RunConfigRequest {
    pub fn new(run_type: RunType, dataset: impl Into<String>, band: Bands) -> Self {
        Self {
            run_type,
            dataset: dataset.into(),
            band,
            wl_config: None,
            serun: None,
            nper: None,
            medsconf: None,
            detrun: None,
            detband: None,
            comment: None,
        }
    }

    /// Build and validate the config, recording software versions from `env`.
    pub fn build<F>(self, run: RunId, env: F) -> Result<RunConfig, RunConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut extra = BTreeMap::new();
        for key in self.run_type.required_env_keys() {
            let value = env(key).ok_or_else(|| RunConfigError::MissingEnvironment(key.into()))?;
            extra.insert(key.to_string(), serde_json::Value::String(value));
        }

        let fileclass = FileClass::new(self.run_type.fileclass())
            .map_err(|e| RunConfigError::Invalid(e.to_string()))?;

        let config = RunConfig {
            run,
            run_type: self.run_type,
            band: self.band,
            fileclass,
            dataset: self.dataset,
            wl_config: self.wl_config,
            serun: self.serun,
            nper: self.nper,
            ppn: None,
            nodes: None,
            queue: None,
            detrun: self.detrun,
            detband: self.detband,
            medsconf: self.medsconf,
            version: None,
            config: None,
            comment: self.comment,
            extra,
        };
        config.validate()?;
        Ok(config)
    }
}

/// First free run name `{type}{nnn:03}{band}[t]`.
///
/// `exists` reports whether a config for the candidate is already stored.
pub fn next_run_name<F>(
    run_type: RunType,
    band: &Band,
    test: bool,
    exists: F,
) -> Result<RunId, RunConfigError>
where
    F: Fn(&RunId) -> bool,
{
    let mut number = run_type.start_number(test);
    loop {
        let name = format!("{}{:03}{}{}", run_type, number, band, if test { "t" } else { "" });
        let run = RunId::new(&name).map_err(|e| RunConfigError::Invalid(e.to_string()))?;
        if !exists(&run) {
            return Ok(run);
        }
        number += 1;
    }
}
