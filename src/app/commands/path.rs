//! Resolve one output path.

use std::path::PathBuf;

use crate::domain::naming::ensure_parent_dir;
use crate::domain::{
    AppError, Chunk, FileClass, FileTypeRegistry, PathRequest, PathResolver, ProcessingKind,
    RunId, UnitSpec,
};

#[derive(Debug, Clone)]
pub struct PathOptions {
    pub run: RunId,
    pub fileclass: FileClass,
    pub kind: ProcessingKind,
    pub unit: UnitSpec,
    pub filetype: String,
    /// Registry default when absent.
    pub ext: Option<String>,
    pub range: Option<Chunk>,
    pub omit_run: bool,
    /// Module whose file types are accepted besides the standard ones.
    pub module: Option<String>,
    pub mkdir: bool,
}

pub fn execute(desdata: PathBuf, options: &PathOptions) -> Result<PathBuf, AppError> {
    let registry = match &options.module {
        Some(name) => super::module_named(name)?.registry()?,
        None => FileTypeRegistry::standard(),
    };
    let resolver = PathResolver::new(desdata, registry);

    let mut request = PathRequest::new(
        options.run.clone(),
        options.fileclass.clone(),
        options.kind,
        options.unit.clone(),
        options.filetype.clone(),
        options.ext.clone().unwrap_or_default(),
    );
    if let Some(range) = options.range {
        request = request.with_range(range);
    }
    if options.omit_run {
        request = request.without_run_prefix();
    }

    let path = match options.ext {
        Some(_) => resolver.resolve(&request)?,
        None => resolver.resolve_default(&request)?,
    };

    if options.mkdir {
        ensure_parent_dir(&path)?;
    }
    Ok(path)
}
