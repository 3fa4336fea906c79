//! Validated identifiers that end up as path components.

pub mod validation;

use super::NamingError;
use crate::impl_validated_id;

/// Processing campaign tag such as `se014i` or `me003it`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(String);

impl_validated_id!(RunId, false, NamingError::InvalidArgument, "run");

/// Root sub-tree selector such as `red`, `coadd`, `wlpipe` or `am`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileClass(String);

impl_validated_id!(FileClass, false, NamingError::InvalidArgument, "file class");

impl FileClass {
    pub const RED: &'static str = "red";
    pub const COADD: &'static str = "coadd";
    pub const WLPIPE: &'static str = "wlpipe";
}

/// Exposure name such as `decam-1-22` or `DECam_00154939`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExposureName(String);

impl_validated_id!(ExposureName, false, NamingError::InvalidUnit, "exposure name");

/// Coadd tile name such as `DES0652-5622`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileName(String);

impl_validated_id!(TileName, false, NamingError::InvalidUnit, "tile name");

/// Photometric band.
///
/// Any short path-safe string is accepted; no fixed set of DES bands is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Band(String);

impl_validated_id!(Band, false, NamingError::InvalidUnit, "band");
