use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NamingError, ProcessingKind};
use crate::domain::identifiers::validation::{validate_extension, validate_identifier};

/// Tags every job carries regardless of processing kind.
pub const JOB_SUPPORT_TYPES: [(&str, &str); 6] = [
    ("stat", "yaml"),
    ("log", "log"),
    ("meta", "json"),
    ("status", "txt"),
    ("script", "sh"),
    ("check", "json"),
];

const SE_TYPES: [(&str, &str); 15] = [
    ("stars", "fits"),
    ("stars1", "fits"),
    ("stars2", "fits"),
    ("psf", "fits"),
    ("psf1", "fits"),
    ("psf2", "fits"),
    ("fitpsf", "fits"),
    ("fitpsf1", "fits"),
    ("fitpsf2", "fits"),
    ("shear", "fits"),
    ("shear1", "fits"),
    ("shear2", "fits"),
    ("qa", "dat"),
    ("debug", "dat"),
    ("checkpsf", "rec"),
];

const ME_TYPES: [(&str, &str); 4] =
    [("multishear", "fits"), ("qa", "dat"), ("debug", "dat"), ("seinputs", "dat")];

/// A registered file type.
///
/// `typename` is the token written into paths. It differs from `key` only
/// when several keys share a name but not an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeSpec {
    pub key: String,
    pub typename: String,
    pub ext: String,
}

impl FileTypeSpec {
    pub fn new(key: impl Into<String>, ext: impl Into<String>) -> Self {
        let key = key.into();
        Self { typename: key.clone(), key, ext: ext.into() }
    }

    pub fn with_typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = typename.into();
        self
    }

    fn validate(&self) -> Result<(), NamingError> {
        if !validate_identifier(&self.key, false) || !validate_identifier(&self.typename, false) {
            return Err(NamingError::InvalidArgument(format!(
                "invalid file type '{}' (typename '{}')",
                self.key, self.typename
            )));
        }
        if !validate_extension(&self.ext) {
            return Err(NamingError::InvalidArgument(format!(
                "invalid extension '{}' for file type '{}'",
                self.ext, self.key
            )));
        }
        Ok(())
    }
}

/// Valid file type tags per processing kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeRegistry {
    by_kind: BTreeMap<ProcessingKind, BTreeMap<String, FileTypeSpec>>,
}

impl FileTypeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the standard SE and ME products plus job support tags.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let mut insert = |kind: ProcessingKind, key: &str, ext: &str| {
            registry
                .by_kind
                .entry(kind)
                .or_default()
                .insert(key.to_string(), FileTypeSpec::new(key, ext));
        };

        for (key, ext) in SE_TYPES {
            insert(ProcessingKind::SingleEpoch, key, ext);
        }
        for (key, ext) in ME_TYPES {
            insert(ProcessingKind::MultiEpoch, key, ext);
        }
        for kind in ProcessingKind::ALL {
            for (key, ext) in JOB_SUPPORT_TYPES {
                insert(kind, key, ext);
            }
        }
        registry
    }

    /// Register a file type for `kind`, replacing any spec with the same key.
    pub fn register(
        &mut self,
        kind: ProcessingKind,
        spec: FileTypeSpec,
    ) -> Result<(), NamingError> {
        spec.validate()?;
        self.by_kind.entry(kind).or_default().insert(spec.key.clone(), spec);
        Ok(())
    }

    pub fn lookup(
        &self,
        kind: ProcessingKind,
        filetype: &str,
    ) -> Result<&FileTypeSpec, NamingError> {
        self.by_kind.get(&kind).and_then(|types| types.get(filetype)).ok_or_else(|| {
            NamingError::UnknownFileType { filetype: filetype.to_string(), kind }
        })
    }

    pub fn contains(&self, kind: ProcessingKind, filetype: &str) -> bool {
        self.lookup(kind, filetype).is_ok()
    }

    pub fn default_ext(&self, kind: ProcessingKind, filetype: &str) -> Result<&str, NamingError> {
        self.lookup(kind, filetype).map(|spec| spec.ext.as_str())
    }

    /// Registered specs for `kind`, ordered by key.
    pub fn filetypes(&self, kind: ProcessingKind) -> impl Iterator<Item = &FileTypeSpec> {
        self.by_kind.get(&kind).into_iter().flat_map(|types| types.values())
    }
}

/// Canonical extension for collated products.
pub fn normalize_extension(ext: &str) -> Result<&'static str, NamingError> {
    match ext.to_ascii_lowercase().as_str() {
        "fits" | "fit" => Ok("fits"),
        "rec" | "pya" => Ok("rec"),
        "json" => Ok("json"),
        "yaml" => Ok("yaml"),
        "xml" => Ok("xml"),
        "eps" => Ok("eps"),
        "ps" => Ok("ps"),
        "png" => Ok("png"),
        _ => Err(NamingError::InvalidArgument(format!("don't know about '{}' files", ext))),
    }
}
