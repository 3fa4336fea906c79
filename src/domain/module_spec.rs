//! Descriptions of the external back-ends a run can drive.

use super::naming::{FileTypeRegistry, FileTypeSpec, NamingError, ProcessingKind};

/// How long a job is expected to take, and when it is killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Fixed seconds per job.
    PerJob { seconds: u64, timeout: u64 },
    /// Seconds per object; a job of `nper` objects gets `nper` times that,
    /// and the same value as its timeout.
    PerObject { seconds: u64 },
}

/// One external back-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub kind: ProcessingKind,
    pub filetypes: Vec<FileTypeSpec>,
    pub timing: Timing,
    /// Overrides the walltime computed from the timing.
    pub walltime_hours: Option<u64>,
    /// Removed from job names to keep them short.
    pub strip_prefixes: &'static [&'static str],
    /// `(module, run config version key)` pairs to `module load`.
    pub module_loads: &'static [(&'static str, &'static str)],
    /// Outputs of the run's `serun` consumed as inputs.
    pub serun_inputs: &'static [&'static str],
    /// Whether tile jobs also read the detection run's outputs.
    pub uses_detband: bool,
    /// Embedded template holding the module's shell commands.
    pub command_template: &'static str,
}

impl ModuleSpec {
    /// Seconds a job is expected to take. `None` when the module counts
    /// per object and the run sets no `nper`.
    pub fn seconds_per_job(&self, nper: Option<u64>) -> Option<u64> {
        match self.timing {
            Timing::PerJob { seconds, .. } => Some(seconds),
            Timing::PerObject { seconds } => nper.map(|n| n * seconds),
        }
    }

    pub fn timeout(&self, nper: Option<u64>) -> Option<u64> {
        match self.timing {
            Timing::PerJob { timeout, .. } => Some(timeout),
            Timing::PerObject { .. } => self.seconds_per_job(nper),
        }
    }

    pub fn job_name(&self, raw: &str) -> String {
        self.strip_prefixes.iter().fold(raw.to_string(), |name, prefix| name.replace(prefix, ""))
    }

    /// Standard registry extended with this module's file types.
    pub fn registry(&self) -> Result<FileTypeRegistry, NamingError> {
        let mut registry = FileTypeRegistry::standard();
        for spec in &self.filetypes {
            registry.register(self.kind, spec.clone())?;
        }
        Ok(registry)
    }

    pub fn filetype_keys(&self) -> impl Iterator<Item = &str> {
        self.filetypes.iter().map(|f| f.key.as_str())
    }
}

fn fits(keys: &[&str]) -> Vec<FileTypeSpec> {
    keys.iter().map(|key| FileTypeSpec::new(*key, "fits")).collect()
}

/// Every module this build knows about, in display order.
pub fn builtin_modules() -> Vec<ModuleSpec> {
    use ProcessingKind::{MultiEpoch, SingleEpoch};

    vec![
        ModuleSpec {
            name: "shapelets",
            kind: SingleEpoch,
            filetypes: fits(&["stars", "psf", "fitpsf", "shear"]),
            timing: Timing::PerJob { seconds: 250, timeout: 15 * 60 },
            walltime_hours: None,
            strip_prefixes: &["decam-", "DECam_"],
            module_loads: &[("shapelets", "SHAPELETS_VERS")],
            serun_inputs: &[],
            uses_detband: false,
            command_template: "shapelets.sh.j2",
        },
        ModuleSpec {
            name: "multishear",
            kind: MultiEpoch,
            filetypes: vec![
                FileTypeSpec::new("multishear", "fits"),
                FileTypeSpec::new("qa", "dat"),
                FileTypeSpec::new("debug", "dat"),
            ],
            timing: Timing::PerJob { seconds: 60 * 60, timeout: 2 * 60 * 60 },
            walltime_hours: None,
            strip_prefixes: &["DES"],
            module_loads: &[("shapelets", "SHAPELETS_VERS")],
            serun_inputs: &["shear", "fitpsf"],
            uses_detband: false,
            command_template: "multishear.sh.j2",
        },
        ModuleSpec {
            name: "am",
            kind: SingleEpoch,
            filetypes: fits(&["am"]),
            timing: Timing::PerJob { seconds: 60, timeout: 15 * 60 },
            walltime_hours: None,
            strip_prefixes: &["decam-", "DECam_"],
            module_loads: &[("esutil", "ESUTIL_VERS"), ("espy", "ESPY_VERS")],
            serun_inputs: &[],
            uses_detband: false,
            command_template: "am.sh.j2",
        },
        ModuleSpec {
            name: "impyp",
            kind: SingleEpoch,
            filetypes: vec![FileTypeSpec::new("shear", "dat")],
            timing: Timing::PerJob { seconds: 60, timeout: 15 * 60 },
            walltime_hours: None,
            strip_prefixes: &["decam-", "DECam_"],
            module_loads: &[("impyp", "IMPYP_VERS")],
            serun_inputs: &["stars"],
            uses_detband: false,
            command_template: "impyp.sh.j2",
        },
        ModuleSpec {
            name: "eyeball",
            kind: SingleEpoch,
            filetypes: vec![
                FileTypeSpec::new("mosaic_jpg", "jpg").with_typename("mosaic"),
                FileTypeSpec::new("mosaic_fits", "fits.fz").with_typename("mosaic"),
                FileTypeSpec::new("field_jpg2", "jpg").with_typename("field2"),
                FileTypeSpec::new("field_jpg4", "jpg").with_typename("field4"),
            ],
            timing: Timing::PerJob { seconds: 20, timeout: 5 * 60 * 60 },
            walltime_hours: None,
            strip_prefixes: &["DECam_"],
            module_loads: &[],
            serun_inputs: &[],
            uses_detband: false,
            command_template: "eyeball.sh.j2",
        },
        ModuleSpec {
            name: "im3shape",
            kind: MultiEpoch,
            filetypes: vec![FileTypeSpec::new("raw", "txt"), FileTypeSpec::new("clean", "txt")],
            timing: Timing::PerJob { seconds: 60 * 60, timeout: 60 * 60 },
            walltime_hours: None,
            strip_prefixes: &["DES"],
            module_loads: &[("im3shape", "IM3SHAPE_VERS")],
            serun_inputs: &[],
            uses_detband: false,
            command_template: "im3shape.sh.j2",
        },
        ModuleSpec {
            name: "gmix_fit_meds",
            kind: MultiEpoch,
            filetypes: fits(&["lmfit"]),
            timing: Timing::PerObject { seconds: 10 },
            walltime_hours: None,
            strip_prefixes: &["DES"],
            module_loads: &[("gmix_meds", "GMIX_MEDS_VERS")],
            serun_inputs: &[],
            uses_detband: false,
            command_template: "gmix_fit_meds.sh.j2",
        },
        ModuleSpec {
            name: "gmix_mcmc_meds",
            kind: MultiEpoch,
            filetypes: fits(&["mcmc"]),
            timing: Timing::PerObject { seconds: 60 },
            walltime_hours: Some(4),
            strip_prefixes: &["DES"],
            module_loads: &[("gmix_meds", "GMIX_MEDS_VERS")],
            serun_inputs: &[],
            uses_detband: true,
            command_template: "gmix_mcmc_meds.sh.j2",
        },
    ]
}

pub fn find_module(name: &str) -> Option<ModuleSpec> {
    builtin_modules().into_iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run_config::RunType;

    #[test]
    fn every_run_type_has_a_module_of_its_kind() {
        for run_type in RunType::ALL {
            let module = find_module(run_type.module_name()).unwrap();
            assert_eq!(module.kind, run_type.kind(), "{}", run_type);
        }
    }

    #[test]
    fn per_object_timing_scales_with_nper() {
        let module = find_module("gmix_fit_meds").unwrap();
        assert_eq!(module.seconds_per_job(Some(100)), Some(1000));
        assert_eq!(module.timeout(Some(100)), Some(1000));
        assert_eq!(module.seconds_per_job(None), None);

        let module = find_module("shapelets").unwrap();
        assert_eq!(module.seconds_per_job(None), Some(250));
        assert_eq!(module.timeout(Some(7)), Some(900));
    }

    #[test]
    fn job_names_drop_prefixes() {
        let module = find_module("shapelets").unwrap();
        assert_eq!(module.job_name("decam-1-22-07"), "1-22-07");
        let module = find_module("gmix_mcmc_meds").unwrap();
        assert_eq!(module.job_name("DES0652-5622-i-000000-000099"), "0652-5622-i-000000-000099");
    }

    #[test]
    fn module_registry_exposes_typenames() {
        let module = find_module("eyeball").unwrap();
        let registry = module.registry().unwrap();
        let spec = registry.lookup(ProcessingKind::SingleEpoch, "mosaic_fits").unwrap();
        assert_eq!(spec.typename, "mosaic");
        assert_eq!(spec.ext, "fits.fz");
    }

    #[test]
    fn module_registry_overrides_default_extension() {
        let registry = find_module("impyp").unwrap().registry().unwrap();
        assert_eq!(registry.default_ext(ProcessingKind::SingleEpoch, "shear").unwrap(), "dat");
    }

    #[test]
    fn unknown_module_is_none() {
        assert!(find_module("hizqso").is_none());
    }
}
