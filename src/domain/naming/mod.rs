//! Path naming: units, file types and the deterministic resolver.

mod error;
mod filetype;
pub mod inputs;
mod kind;
mod resolver;
mod run_files;
pub mod submit;
mod unit;

pub use error::NamingError;
pub use filetype::{FileTypeRegistry, FileTypeSpec, JOB_SUPPORT_TYPES, normalize_extension};
pub use kind::ProcessingKind;
pub use resolver::{
    NamingBranch, PathRequest, PathResolver, RunNaming, ensure_dir, ensure_parent_dir,
};
pub use submit::SubmitLayout;
pub use unit::{Ccd, ProcessingUnit, UnitSpec};
