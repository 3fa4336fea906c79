//! Paths of pipeline inputs in the DES data layout, and their inverse.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Ccd, NamingError};

/// `{root}/red/{redrun}/red/{expname}/{expname}_{ccd:02}.fits[.fz]`
pub fn red_image_path(root: &Path, redrun: &str, expname: &str, ccd: Ccd, fz: bool) -> PathBuf {
    let name = format!("{}_{}.fits{}", expname, ccd, if fz { ".fz" } else { "" });
    red_exposure_dir(root, redrun, expname).join(name)
}

pub fn red_cat_path(root: &Path, redrun: &str, expname: &str, ccd: Ccd) -> PathBuf {
    red_exposure_dir(root, redrun, expname).join(format!("{}_{}_cat.fits", expname, ccd))
}

fn red_exposure_dir(root: &Path, redrun: &str, expname: &str) -> PathBuf {
    root.join("red").join(redrun).join("red").join(expname)
}

/// `{root}/coadd/{coaddrun}/coadd/{tile}_{band}.fits[.fz]`
pub fn coadd_image_path(root: &Path, coaddrun: &str, tile: &str, band: &str, fz: bool) -> PathBuf {
    let name = format!("{}_{}.fits{}", tile, band, if fz { ".fz" } else { "" });
    coadd_tile_dir(root, coaddrun).join(name)
}

pub fn coadd_cat_path(root: &Path, catalogrun: &str, tile: &str, band: &str) -> PathBuf {
    coadd_tile_dir(root, catalogrun).join(format!("{}_{}_cat.fits", tile, band))
}

fn coadd_tile_dir(root: &Path, coaddrun: &str) -> PathBuf {
    root.join("coadd").join(coaddrun).join("coadd")
}

/// `{root}/meds/{medsconf}/{coadd_run}/{tile}-{band}-meds-{medsconf}.fits.fz`
pub fn meds_path(root: &Path, medsconf: &str, coadd_run: &str, tile: &str, band: &str) -> PathBuf {
    root.join("meds")
        .join(medsconf)
        .join(coadd_run)
        .join(format!("{}-{}-meds-{}.fits.fz", tile, band, medsconf))
}

/// Derive a background image path from an image path (`.fits.fz` → `_bkg.fits.fz`).
pub fn derive_bkg_path(image: &str) -> String {
    format!("{}_bkg.fits.fz", strip_fits_extension(image))
}

/// Derive a catalog path from an image path (`.fits.fz` → `_cat.fits`).
pub fn derive_cat_path(image: &str) -> String {
    format!("{}_cat.fits", strip_fits_extension(image))
}

/// Strip a trailing `.fits` or `.fits.fz`.
pub fn strip_fits_extension(name: &str) -> &str {
    name.strip_suffix(".fits.fz").or_else(|| name.strip_suffix(".fits")).unwrap_or(name)
}

/// Fields recovered from a reduced-image or reduced-catalog path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedPathInfo {
    pub redrun: String,
    pub expname: String,
    pub ccd: Ccd,
    pub basename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoaddType {
    Image,
    Cat,
}

/// Fields recovered from a coadd image or catalog path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoaddPathInfo {
    pub coaddrun: String,
    pub tilename: String,
    pub band: String,
    pub coaddtype: CoaddType,
}

fn tail_components(path: &Path, n: usize) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    (parts.len() >= n).then(|| parts[parts.len() - n..].to_vec())
}

fn mismatch(path: &Path, what: &str) -> NamingError {
    NamingError::InvalidUnit(format!("{} is not a {} path", path.display(), what))
}

/// Invert [`red_image_path`] and [`red_cat_path`].
pub fn parse_red_path(path: &Path) -> Result<RedPathInfo, NamingError> {
    let parts = tail_components(path, 5).ok_or_else(|| mismatch(path, "reduced"))?;
    let [red1, redrun, red2, expname, basename] =
        [parts[0], parts[1], parts[2], parts[3], parts[4]];
    if red1 != "red" || red2 != "red" {
        return Err(mismatch(path, "reduced"));
    }

    let stem = strip_fits_extension(basename);
    let stem = stem.strip_suffix("_cat").unwrap_or(stem);
    let (prefix, ccd) = stem.rsplit_once('_').ok_or_else(|| mismatch(path, "reduced"))?;
    if prefix != expname || ccd.len() != 2 {
        return Err(mismatch(path, "reduced"));
    }

    Ok(RedPathInfo {
        redrun: redrun.to_string(),
        expname: expname.to_string(),
        ccd: ccd.parse()?,
        basename: basename.to_string(),
    })
}

/// Invert [`coadd_image_path`] and [`coadd_cat_path`].
pub fn parse_coadd_path(path: &Path) -> Result<CoaddPathInfo, NamingError> {
    let parts = tail_components(path, 4).ok_or_else(|| mismatch(path, "coadd"))?;
    let [coadd1, coaddrun, coadd2, basename] = [parts[0], parts[1], parts[2], parts[3]];
    if coadd1 != "coadd" || coadd2 != "coadd" {
        return Err(mismatch(path, "coadd"));
    }

    let stem = strip_fits_extension(basename);
    let (stem, coaddtype) = match stem.strip_suffix("_cat") {
        Some(s) => (s, CoaddType::Cat),
        None => (stem, CoaddType::Image),
    };
    let (tilename, band) = stem.rsplit_once('_').ok_or_else(|| mismatch(path, "coadd"))?;
    if tilename.is_empty() || band.is_empty() {
        return Err(mismatch(path, "coadd"));
    }

    Ok(CoaddPathInfo {
        coaddrun: coaddrun.to_string(),
        tilename: tilename.to_string(),
        band: band.to_string(),
        coaddtype,
    })
}
