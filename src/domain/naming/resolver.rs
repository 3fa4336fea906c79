//! Deterministic output paths for `(run, unit, filetype, [range])` tuples.
//!
//! Layout: `{root}/{fileclass}/{run}/{primary_key}/{basename}` where the
//! basename joins its segments with `-` and appends `.{ext}`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{FileTypeRegistry, FileTypeSpec, NamingError, ProcessingKind, ProcessingUnit, UnitSpec};
use crate::domain::chunks::Chunk;
use crate::domain::identifiers::validation::validate_extension;
use crate::domain::identifiers::{FileClass, RunId};

const SEPARATOR: &str = "-";

/// Whether the run tag leads the basename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunNaming {
    #[default]
    Prefixed,
    /// Run segment left out of the basename. Multi-epoch only.
    Omitted,
}

/// Naming branch selected by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingBranch {
    Se,
    Me,
    MeSplit,
}

/// One path resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub run: RunId,
    pub fileclass: FileClass,
    pub kind: ProcessingKind,
    pub unit: UnitSpec,
    pub filetype: String,
    pub ext: String,
    pub range: Option<Chunk>,
    pub run_naming: RunNaming,
}

impl PathRequest {
    pub fn new(
        run: RunId,
        fileclass: FileClass,
        kind: ProcessingKind,
        unit: UnitSpec,
        filetype: impl Into<String>,
        ext: impl Into<String>,
    ) -> Self {
        Self {
            run,
            fileclass,
            kind,
            unit,
            filetype: filetype.into(),
            ext: ext.into(),
            range: None,
            run_naming: RunNaming::Prefixed,
        }
    }

    pub fn with_range(mut self, range: Chunk) -> Self {
        self.range = Some(range);
        self
    }

    pub fn without_run_prefix(mut self) -> Self {
        self.run_naming = RunNaming::Omitted;
        self
    }

    pub fn branch(&self) -> Result<NamingBranch, NamingError> {
        branch_for(self.kind, self.range.as_ref())
    }
}

fn branch_for(kind: ProcessingKind, range: Option<&Chunk>) -> Result<NamingBranch, NamingError> {
    match (kind, range) {
        (ProcessingKind::SingleEpoch, None) => Ok(NamingBranch::Se),
        (ProcessingKind::SingleEpoch, Some(_)) => Err(NamingError::InvalidArgument(
            "sub-ranges apply to multi-epoch units only".to_string(),
        )),
        (ProcessingKind::MultiEpoch, None) => Ok(NamingBranch::Me),
        (ProcessingKind::MultiEpoch, Some(_)) => Ok(NamingBranch::MeSplit),
    }
}

/// Pure path resolver rooted at a data directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    registry: FileTypeRegistry,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, registry: FileTypeRegistry) -> Self {
        Self { root: root.into(), registry }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &FileTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FileTypeRegistry {
        &mut self.registry
    }

    /// `{root}/{fileclass}/{run}`
    pub fn run_dir(&self, fileclass: &FileClass, run: &RunId) -> PathBuf {
        self.root.join(fileclass.as_str()).join(run.as_str())
    }

    /// Directory holding every output of `unit`.
    pub fn unit_dir(&self, fileclass: &FileClass, run: &RunId, unit: &ProcessingUnit) -> PathBuf {
        self.run_dir(fileclass, run).join(unit.primary_key())
    }

    pub fn resolve(&self, request: &PathRequest) -> Result<PathBuf, NamingError> {
        let unit = request.unit.to_unit(request.kind)?;
        self.resolve_unit(
            &request.run,
            &request.fileclass,
            &unit,
            &request.filetype,
            &request.ext,
            request.range.as_ref(),
            request.run_naming,
        )
    }

    /// Resolve using the registry's default extension for the file type.
    pub fn resolve_default(&self, request: &PathRequest) -> Result<PathBuf, NamingError> {
        let ext = self.registry.default_ext(request.kind, &request.filetype)?;
        let request = PathRequest { ext: ext.to_string(), ..request.clone() };
        self.resolve(&request)
    }

    /// Resolve for an already validated unit.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_unit(
        &self,
        run: &RunId,
        fileclass: &FileClass,
        unit: &ProcessingUnit,
        filetype: &str,
        ext: &str,
        range: Option<&Chunk>,
        run_naming: RunNaming,
    ) -> Result<PathBuf, NamingError> {
        let kind = unit.kind();
        let spec = self.registry.lookup(kind, filetype)?;
        let branch = branch_for(kind, range)?;

        if run_naming == RunNaming::Omitted && kind == ProcessingKind::SingleEpoch {
            return Err(NamingError::InvalidUnit(
                "single-epoch names always carry the run".to_string(),
            ));
        }
        if !validate_extension(ext) {
            return Err(NamingError::InvalidArgument(format!("invalid extension '{}'", ext)));
        }

        let range = range.filter(|_| branch == NamingBranch::MeSplit);
        let name = basename(run, unit, spec, ext, range, run_naming);
        Ok(self.unit_dir(fileclass, run, unit).join(name))
    }
}

fn basename(
    run: &RunId,
    unit: &ProcessingUnit,
    spec: &FileTypeSpec,
    ext: &str,
    range: Option<&Chunk>,
    run_naming: RunNaming,
) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(6);
    if run_naming == RunNaming::Prefixed {
        segments.push(run.to_string());
    }
    segments.extend(unit.name_segments());
    if let Some(chunk) = range {
        segments.push(format!("{:06}", chunk.start));
        segments.push(format!("{:06}", chunk.end));
    }
    segments.push(spec.typename.clone());

    format!("{}.{}", segments.join(SEPARATOR), ext)
}

/// Create the parent directory of `path` if absent.
///
/// Safe to call concurrently: losing a creation race is success.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/des", FileTypeRegistry::standard())
    }

    fn se_request(ccd: &str, filetype: &str) -> PathRequest {
        PathRequest::new(
            RunId::new("se014i").unwrap(),
            FileClass::new("red").unwrap(),
            ProcessingKind::SingleEpoch,
            UnitSpec::exposure("decam-1-22", ccd),
            filetype,
            "fits",
        )
    }

    fn me_request() -> PathRequest {
        PathRequest::new(
            RunId::new("me003i").unwrap(),
            FileClass::new("wlpipe").unwrap(),
            ProcessingKind::MultiEpoch,
            UnitSpec::tile("DES0652-5622", "i"),
            "multishear",
            "fits",
        )
    }

    #[test]
    fn resolves_se_shear_path() {
        let path = resolver().resolve(&se_request("7", "shear")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/des/red/se014i/decam-1-22/se014i-decam-1-22-07-shear.fits")
        );
        assert!(path.ends_with("se014i/decam-1-22/se014i-decam-1-22-07-shear.fits"));
    }

    #[test]
    fn ccd_padding_is_input_independent() {
        let a = resolver().resolve(&se_request("7", "shear")).unwrap();
        let b = resolver().resolve(&se_request("07", "shear")).unwrap();
        assert_eq!(a, b);
        assert!(a.to_string_lossy().contains("-07-"));
    }

    #[test]
    fn unknown_filetype_is_rejected() {
        let err = resolver().resolve(&se_request("7", "bogus")).unwrap_err();
        assert!(matches!(
            err,
            NamingError::UnknownFileType { ref filetype, kind: ProcessingKind::SingleEpoch }
                if filetype == "bogus"
        ));
    }

    #[test]
    fn missing_ccd_is_invalid_unit() {
        let mut request = se_request("7", "shear");
        request.unit.ccd = None;
        assert!(matches!(resolver().resolve(&request), Err(NamingError::InvalidUnit(_))));
    }

    #[test]
    fn me_path_and_split_variant() {
        let plain = resolver().resolve(&me_request()).unwrap();
        assert_eq!(
            plain,
            PathBuf::from("/des/wlpipe/me003i/DES0652-5622/me003i-DES0652-5622-i-multishear.fits")
        );

        let request = me_request().with_range(Chunk::new(0, 119).unwrap());
        assert_eq!(request.branch().unwrap(), NamingBranch::MeSplit);
        let split = resolver().resolve(&request).unwrap();
        assert_eq!(
            split.file_name().unwrap().to_string_lossy(),
            "me003i-DES0652-5622-i-000000-000119-multishear.fits"
        );
        assert_eq!(split.parent(), plain.parent());
    }

    #[test]
    fn omitted_run_only_for_me() {
        let path = resolver().resolve(&me_request().without_run_prefix()).unwrap();
        assert!(path.ends_with("me003i/DES0652-5622/DES0652-5622-i-multishear.fits"));

        let err = resolver().resolve(&se_request("7", "shear").without_run_prefix()).unwrap_err();
        assert!(matches!(err, NamingError::InvalidUnit(_)));
    }

    #[test]
    fn range_on_se_is_rejected() {
        let request = se_request("7", "shear").with_range(Chunk::new(0, 9).unwrap());
        assert!(matches!(resolver().resolve(&request), Err(NamingError::InvalidArgument(_))));
    }

    #[test]
    fn resolve_default_uses_registry_extension() {
        let path = resolver().resolve_default(&se_request("7", "stat")).unwrap();
        assert!(path.to_string_lossy().ends_with("-07-stat.yaml"));
    }

    #[test]
    fn typename_replaces_key_in_path() {
        let mut resolver = resolver();
        resolver
            .registry_mut()
            .register(
                ProcessingKind::SingleEpoch,
                FileTypeSpec::new("mosaic_jpg", "jpg").with_typename("mosaic"),
            )
            .unwrap();
        let path = resolver.resolve_default(&se_request("3", "mosaic_jpg")).unwrap();
        assert!(path.to_string_lossy().ends_with("se014i-decam-1-22-03-mosaic.jpg"));
    }

    #[test]
    fn ensure_parent_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a/b/c.fits");
        ensure_parent_dir(&file).unwrap();
        ensure_parent_dir(&file).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
    }

    #[test]
    fn ensure_dir_fails_on_file_in_the_way() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        assert!(ensure_dir(&blocker).is_err());
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(
            ccd in 0u32..100,
            filetype in prop::sample::select(vec!["stars", "psf", "shear", "stat", "log"]),
        ) {
            let request = se_request(&ccd.to_string(), filetype);
            let first = resolver().resolve(&request).unwrap();
            let second = resolver().resolve(&request).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn split_and_unsplit_never_collide(start in 0u64..100_000, len in 1u64..10_000) {
            let chunk = Chunk::new(start, start + len - 1).unwrap();
            let plain = resolver().resolve(&me_request()).unwrap();
            let split = resolver().resolve(&me_request().with_range(chunk)).unwrap();
            prop_assert_ne!(plain, split);
        }
    }
}
