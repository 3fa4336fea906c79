//! Sample runs and file lists for unit tests.

use std::path::Path;

use crate::domain::{
    Band, Bands, Ccd, CoaddInfo, ExposureName, RedInfo, RunConfig, RunConfigRequest, RunId,
    RunType, Settings, SrcEntry, TileName,
};

/// Version lookup that records `{key}-v1` for every key.
pub fn versions(key: &str) -> Option<String> {
    Some(format!("{}-v1", key.to_lowercase()))
}

/// A valid config of `run_type` named `run`, in `band`.
///
/// Required fields get fixed values: `wl_config`, serun `sse001i` and
/// medsconf `013`.
pub fn run_config(run_type: RunType, run: &str, band: &str) -> RunConfig {
    let mut request =
        RunConfigRequest::new(run_type, "sva1", Bands::single(Band::new(band).unwrap()));
    match run_type {
        RunType::Sse | RunType::Sme => request.wl_config = Some("wl-sva1.config".into()),
        RunType::GmixFitMeds | RunType::GmixMcmcMeds | RunType::Im3shape => {
            request.medsconf = Some("013".into())
        }
        _ => {}
    }
    if matches!(run_type, RunType::Sme | RunType::Impyp) {
        request.serun = Some(RunId::new("sse001i").unwrap());
    }
    request.build(RunId::new(run).unwrap(), versions).unwrap()
}

/// A reduced image under `/data/red/red001`.
pub fn red_info(expname: &str, ccd: u32) -> RedInfo {
    RedInfo {
        expname: ExposureName::new(expname).unwrap(),
        ccd: Ccd::new(ccd).unwrap(),
        band: Some(Band::new("i").unwrap()),
        image_url: format!("/data/red/red001/red/{e}/{e}_{c:02}.fits.fz", e = expname, c = ccd),
        bkg_url: None,
        cat_url: None,
    }
}

/// A coadd tile under `/data/coadd/coadd001` with two source images.
pub fn coadd_info(tile: &str, band: &str) -> CoaddInfo {
    let base = format!("/data/coadd/coadd001/coadd/{}_{}", tile, band);
    CoaddInfo {
        tilename: TileName::new(tile).unwrap(),
        band: Band::new(band).unwrap(),
        coadd_run: "coadd001".into(),
        image_url: format!("{}.fits.fz", base),
        cat_url: format!("{}_cat.fits", base),
        srclist: vec![src_entry("decam-1-22", 7), src_entry("decam-1-23", 12)],
    }
}

fn src_entry(expname: &str, ccd: u32) -> SrcEntry {
    SrcEntry {
        expname: ExposureName::new(expname).unwrap(),
        ccd: Ccd::new(ccd).unwrap(),
        red_image: format!("/data/red/red001/red/{e}/{e}_{c:02}.fits.fz", e = expname, c = ccd),
    }
}

/// Default settings with every path under `root`.
pub fn settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.desdata = root.join("DES");
    settings.paths.submit_root = Some(root.join("submit"));
    settings.paths.runconfig_dir = Some(root.join("runconfig"));
    settings.paths.file_lists = Some(root.join("file_lists"));
    settings
}
