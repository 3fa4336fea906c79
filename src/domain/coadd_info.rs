//! File-list records describing pipeline inputs, and the coadd-info cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::identifiers::{Band, ExposureName, TileName};
use super::naming::Ccd;
use super::naming::inputs::{derive_bkg_path, derive_cat_path};

/// One reduced CCD image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedInfo {
    pub expname: ExposureName,
    pub ccd: Ccd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<Band>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bkg_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cat_url: Option<String>,
}

impl RedInfo {
    /// `image`, `bkg` and `cat` inputs, deriving the latter two when absent.
    pub fn input_files(&self) -> BTreeMap<String, String> {
        let bkg = self.bkg_url.clone().unwrap_or_else(|| derive_bkg_path(&self.image_url));
        let cat = self.cat_url.clone().unwrap_or_else(|| derive_cat_path(&self.image_url));
        BTreeMap::from([
            ("image".to_string(), self.image_url.clone()),
            ("bkg".to_string(), bkg),
            ("cat".to_string(), cat),
        ])
    }
}

/// Single-epoch image that went into a coadd.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcEntry {
    pub expname: ExposureName,
    pub ccd: Ccd,
    pub red_image: String,
}

/// One coadd tile in one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoaddInfo {
    pub tilename: TileName,
    pub band: Band,
    pub coadd_run: String,
    pub image_url: String,
    pub cat_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub srclist: Vec<SrcEntry>,
}

/// Entries for `band`, optionally narrowed to one tile, ordered by tile.
pub fn select_tiles<'a>(
    infos: &'a [CoaddInfo],
    band: &Band,
    tile: Option<&str>,
) -> Vec<&'a CoaddInfo> {
    let mut selected: Vec<&CoaddInfo> = infos
        .iter()
        .filter(|info| &info.band == band)
        .filter(|info| tile.is_none_or(|t| info.tilename.as_str() == t))
        .collect();
    selected.sort_by(|a, b| a.tilename.cmp(&b.tilename));
    selected
}

/// Find the entry for `(tile, band)`.
pub fn find_tile<'a>(infos: &'a [CoaddInfo], tile: &str, band: &Band) -> Option<&'a CoaddInfo> {
    infos.iter().find(|info| info.tilename.as_str() == tile && &info.band == band)
}

/// Coadd info for the most recently loaded `(dataset, has_srclist)`.
///
/// Loading a different key replaces the held data.
#[derive(Debug, Default)]
pub struct CoaddInfoCache {
    key: Option<(String, bool)>,
    data: Vec<CoaddInfo>,
}

impl CoaddInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F, E>(
        &mut self,
        dataset: &str,
        has_srclist: bool,
        load: F,
    ) -> Result<&[CoaddInfo], E>
    where
        F: FnOnce() -> Result<Vec<CoaddInfo>, E>,
    {
        let hit = self.key.as_ref().is_some_and(|(d, s)| d == dataset && *s == has_srclist);
        if hit {
            tracing::debug!(dataset, has_srclist, "re-using coadd info cache");
        } else {
            tracing::debug!(dataset, has_srclist, "loading coadd info");
            self.data = load()?;
            self.key = Some((dataset.to_string(), has_srclist));
        }
        Ok(&self.data)
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;

    use super::*;

    fn coadd(tile: &str, band: &str) -> CoaddInfo {
        CoaddInfo {
            tilename: TileName::new(tile).unwrap(),
            band: Band::new(band).unwrap(),
            coadd_run: format!("20130320_{}", tile),
            image_url: format!("/des/coadd/20130320_{0}/coadd/{0}_{1}.fits.fz", tile, band),
            cat_url: format!("/des/coadd/20130320_{0}/coadd/{0}_{1}_cat.fits", tile, band),
            srclist: Vec::new(),
        }
    }

    #[test]
    fn red_info_derives_missing_inputs() {
        let info: RedInfo = serde_json::from_str(
            r#"{"expname":"decam-1-22","ccd":3,"image_url":"/d/decam-1-22_03.fits.fz"}"#,
        )
        .unwrap();
        let inputs = info.input_files();
        assert_eq!(inputs["bkg"], "/d/decam-1-22_03_bkg.fits.fz");
        assert_eq!(inputs["cat"], "/d/decam-1-22_03_cat.fits");
    }

    #[test]
    fn red_info_keeps_explicit_inputs() {
        let info = RedInfo {
            expname: ExposureName::new("decam-1-22").unwrap(),
            ccd: Ccd::new(3).unwrap(),
            band: None,
            image_url: "/d/a.fits.fz".into(),
            bkg_url: Some("/d/bkg.fits".into()),
            cat_url: None,
        };
        assert_eq!(info.input_files()["bkg"], "/d/bkg.fits");
    }

    #[test]
    fn select_tiles_filters_band_and_tile() {
        let infos = vec![coadd("DES2", "i"), coadd("DES1", "i"), coadd("DES1", "r")];
        let band = Band::new("i").unwrap();
        let all = select_tiles(&infos, &band, None);
        let names: Vec<&str> = all.iter().map(|c| c.tilename.as_str()).collect();
        assert_eq!(names, vec!["DES1", "DES2"]);
        assert_eq!(select_tiles(&infos, &band, Some("DES2")).len(), 1);
        assert!(find_tile(&infos, "DES1", &Band::new("r").unwrap()).is_some());
    }

    #[test]
    fn cache_reloads_only_on_key_change() {
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok::<_, Infallible>(vec![coadd("DES1", "i")])
        };

        let mut cache = CoaddInfoCache::new();
        cache.get_or_load("sva1", false, load).unwrap();
        cache.get_or_load("sva1", false, load).unwrap();
        assert_eq!(loads.get(), 1);

        cache.get_or_load("sva1", true, load).unwrap();
        assert_eq!(loads.get(), 2);

        cache.invalidate();
        cache.get_or_load("sva1", true, load).unwrap();
        assert_eq!(loads.get(), 3);
    }
}
