//! Turns a run configuration and its file lists into job records.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::adapters::TemplateEngine;
use crate::app::commands::module_named;
use crate::domain::coadd_info::{find_tile, select_tiles};
use crate::domain::job::SUPPORT_OUTPUTS;
use crate::domain::naming::ensure_parent_dir;
use crate::domain::naming::inputs::meds_path;
use crate::domain::naming::submit::{me_job_name, se_job_name};
use crate::domain::{
    AppError, Band, Chunk, CoaddInfo, CoaddInfoCache, FileClass, JobRecord, ModuleSpec,
    PathResolver, ProcessingKind, ProcessingUnit, RedInfo, RunConfig, RunId, RunNaming, chunks,
};
use crate::ports::{FileListSource, RowCountSource};

use super::RenderedFile;

const SRCLIST_TYPE: &str = "seinputs";
const SRCLIST_EXT: &str = "dat";

/// A run whose outputs feed the one being generated.
pub struct UpstreamRun {
    config: RunConfig,
    resolver: PathResolver,
}

impl UpstreamRun {
    pub fn new(config: RunConfig, desdata: &Path) -> Result<Self, AppError> {
        let module = module_named(config.run_type.module_name())?;
        let resolver = PathResolver::new(desdata, module.registry()?);
        Ok(Self { config, resolver })
    }

    pub fn run(&self) -> &RunId {
        &self.config.run
    }

    /// Module products of the upstream run, by file type key.
    fn product_keys(&self) -> Result<Vec<String>, AppError> {
        let module = module_named(self.config.run_type.module_name())?;
        Ok(module.filetype_keys().map(str::to_string).collect())
    }

    fn path(&self, unit: &ProcessingUnit, filetype: &str) -> Result<String, AppError> {
        let ext = self.resolver.registry().default_ext(unit.kind(), filetype)?;
        let path = self.resolver.resolve_unit(
            &self.config.run,
            &self.config.fileclass,
            unit,
            filetype,
            ext,
            None,
            RunNaming::Prefixed,
        )?;
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Fields of the run configuration visible to command templates.
///
/// Optional fields render as `none` rather than failing strict lookups.
#[derive(Serialize)]
struct RunView<'a> {
    run: &'a RunId,
    run_type: String,
    fileclass: &'a str,
    dataset: &'a str,
    band: &'a str,
    wl_config: Option<&'a str>,
    serun: Option<&'a str>,
    medsconf: Option<&'a str>,
    version: Option<&'a str>,
    config: Option<&'a str>,
}

impl<'a> From<&'a RunConfig> for RunView<'a> {
    fn from(config: &'a RunConfig) -> Self {
        Self {
            run: &config.run,
            run_type: config.run_type.to_string(),
            fileclass: config.fileclass.as_str(),
            dataset: &config.dataset,
            band: config.band.first().as_str(),
            wl_config: config.wl_config.as_deref(),
            serun: config.serun.as_ref().map(|r| r.as_str()),
            medsconf: config.medsconf.as_deref(),
            version: config.version.as_deref(),
            config: config.config.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct CommandContext<'a> {
    run: RunView<'a>,
    inputs: &'a BTreeMap<String, String>,
    outputs: &'a BTreeMap<String, String>,
    start: Option<u64>,
    end: Option<u64>,
    nobj: Option<u64>,
    timeout: u64,
    module_loads: &'a [String],
}

/// Everything built for a run before any scheduler text is rendered.
#[derive(Debug, Default)]
pub struct BuiltJobs {
    pub jobs: Vec<JobRecord>,
    /// Input files the builder derives itself, such as multishear source lists.
    pub inputs: Vec<RenderedFile>,
}

pub struct ManifestBuilder<'a, F, R>
where
    F: FileListSource,
    R: RowCountSource,
{
    config: &'a RunConfig,
    module: &'a ModuleSpec,
    desdata: &'a Path,
    resolver: PathResolver,
    file_lists: &'a F,
    rows: &'a R,
    templates: &'a TemplateEngine,
    serun: Option<&'a UpstreamRun>,
    detrun: Option<&'a UpstreamRun>,
    module_loads: Vec<String>,
    write_cache: bool,
}

impl<'a, F, R> ManifestBuilder<'a, F, R>
where
    F: FileListSource,
    R: RowCountSource,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &'a RunConfig,
        module: &'a ModuleSpec,
        desdata: &'a Path,
        file_lists: &'a F,
        rows: &'a R,
        templates: &'a TemplateEngine,
        serun: Option<&'a UpstreamRun>,
        detrun: Option<&'a UpstreamRun>,
    ) -> Result<Self, AppError> {
        if !module.serun_inputs.is_empty() && serun.is_none() {
            return Err(AppError::config_error(format!(
                "module {} reads the outputs of a serun, but run {} names none",
                module.name, config.run
            )));
        }
        Ok(Self {
            config,
            module,
            desdata,
            resolver: PathResolver::new(desdata, module.registry()?),
            file_lists,
            rows,
            templates,
            serun,
            detrun,
            module_loads: module_load_lines(module, config)?,
            write_cache: true,
        })
    }

    /// Leave the file-list cache untouched when it has to be queried.
    pub fn without_cache_writes(mut self) -> Self {
        self.write_cache = false;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn fileclass(&self) -> &FileClass {
        &self.config.fileclass
    }

    pub fn build(
        &self,
        cache: &mut CoaddInfoCache,
        tile: Option<&str>,
    ) -> Result<BuiltJobs, AppError> {
        match self.module.kind {
            ProcessingKind::SingleEpoch => {
                if tile.is_some() {
                    return Err(AppError::config_error("--tile applies to tile runs only"));
                }
                self.by_ccd()
            }
            ProcessingKind::MultiEpoch => self.by_tile(cache, tile),
        }
    }

    fn by_ccd(&self) -> Result<BuiltJobs, AppError> {
        let infos = self.red_info()?;
        tracing::info!(run = %self.config.run, ccds = infos.len(), "building jobs by ccd");

        let mut built = BuiltJobs::default();
        for info in &infos {
            let unit = ProcessingUnit::Exposure { exposure: info.expname.clone(), ccd: info.ccd };
            let mut inputs = info.input_files();
            if let Some(serun) = self.serun {
                for key in self.module.serun_inputs {
                    inputs.insert(key.to_string(), serun.path(&unit, key)?);
                }
            }
            let name = se_job_name(info.expname.as_str(), None, Some(info.ccd));
            built.jobs.push(self.job(unit, None, name, inputs)?);
        }
        Ok(built)
    }

    fn by_tile(
        &self,
        cache: &mut CoaddInfoCache,
        tile: Option<&str>,
    ) -> Result<BuiltJobs, AppError> {
        let has_srclist = !self.module.serun_inputs.is_empty();
        let dataset = &self.config.dataset;
        let infos = cache
            .get_or_load(dataset, has_srclist, || self.file_lists.coadd_info(dataset, has_srclist))?
            .to_vec();

        let band = self.config.band.first();
        let selected = select_tiles(&infos, band, tile);
        if let (Some(tile), true) = (tile, selected.is_empty()) {
            return Err(AppError::InputNotFound(format!(
                "tile {} in band {} of dataset {}",
                tile, band, dataset
            )));
        }
        tracing::info!(run = %self.config.run, tiles = selected.len(), "building jobs by tile");

        let mut built = BuiltJobs::default();
        for info in selected {
            let unit = ProcessingUnit::Tile { tile: info.tilename.clone(), band: band.clone() };
            let mut inputs = BTreeMap::from([
                ("image".to_string(), info.image_url.clone()),
                ("cat".to_string(), info.cat_url.clone()),
            ]);
            inputs.extend(self.meds_inputs(&infos, info)?);
            inputs.extend(self.detband_inputs(info)?);
            if has_srclist {
                let srclist = self.srclist_file(&unit, info)?;
                inputs.insert("srclist".to_string(), srclist.path.to_string_lossy().into_owned());
                built.inputs.push(srclist);
            }

            let ranges: Vec<Option<Chunk>> = match self.config.nper {
                Some(nper) => {
                    let nrow = self.rows.row_count(Path::new(&info.cat_url))?;
                    chunks(nrow, nper)?.into_iter().map(Some).collect()
                }
                None => vec![None],
            };
            for range in ranges {
                let name = me_job_name(info.tilename.as_str(), band.as_str(), range.as_ref());
                built.jobs.push(self.job(unit.clone(), range, name, inputs.clone())?);
            }
        }
        Ok(built)
    }

    fn job(
        &self,
        unit: ProcessingUnit,
        range: Option<Chunk>,
        raw_name: String,
        input_files: BTreeMap<String, String>,
    ) -> Result<JobRecord, AppError> {
        let mut output_files = BTreeMap::new();
        for spec in &self.module.filetypes {
            let path = self.output_path(&unit, &spec.key, &spec.ext, range.as_ref())?;
            output_files.insert(spec.key.clone(), path);
        }
        for key in SUPPORT_OUTPUTS {
            output_files.insert(key.to_string(), self.support_path(&unit, key, range.as_ref())?);
        }
        let script = self.support_path(&unit, "script", range.as_ref())?;

        let timeout = self.module.timeout(self.config.nper).ok_or_else(|| {
            AppError::config_error(format!(
                "module {} times jobs per object; run {} needs nper",
                self.module.name, self.config.run
            ))
        })?;

        let context = CommandContext {
            run: RunView::from(self.config),
            inputs: &input_files,
            outputs: &output_files,
            start: range.map(|c| c.start),
            end: range.map(|c| c.end),
            nobj: range.map(|c| c.len()),
            timeout,
            module_loads: &self.module_loads,
        };
        let command = self.templates.render_command(self.module.command_template, &context)?;

        Ok(JobRecord {
            run: self.config.run.clone(),
            module: self.module.name.to_string(),
            unit,
            range,
            job_name: self.module.job_name(&raw_name),
            input_files,
            output_files,
            script,
            command,
            timeout,
        })
    }

    fn output_path(
        &self,
        unit: &ProcessingUnit,
        filetype: &str,
        ext: &str,
        range: Option<&Chunk>,
    ) -> Result<String, AppError> {
        let path = self.resolver.resolve_unit(
            &self.config.run,
            &self.config.fileclass,
            unit,
            filetype,
            ext,
            range,
            RunNaming::Prefixed,
        )?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn support_path(
        &self,
        unit: &ProcessingUnit,
        key: &str,
        range: Option<&Chunk>,
    ) -> Result<String, AppError> {
        let ext = self.resolver.registry().default_ext(unit.kind(), key)?;
        self.output_path(unit, key, ext, range)
    }

    /// Red info from the run's file-list cache, querying the source on a miss.
    fn red_info(&self) -> Result<Vec<RedInfo>, AppError> {
        let cache = self.resolver.flist_cache_path(
            &self.config.fileclass,
            &self.config.run,
            ProcessingKind::SingleEpoch,
        );
        if cache.exists() {
            tracing::debug!(path = %cache.display(), "file list cache hit");
            let content = fs::read_to_string(&cache)?;
            return serde_json::from_str(&content)
                .map_err(|e| AppError::parse_error(cache.display().to_string(), e));
        }

        tracing::debug!(path = %cache.display(), "file list cache miss");
        let infos = self.file_lists.red_info(&self.config.dataset, &self.config.band)?;
        if self.write_cache {
            ensure_parent_dir(&cache)?;
            let content = serde_json::to_string_pretty(&infos)
                .map_err(|e| AppError::parse_error("file list", e))?;
            fs::write(&cache, content)?;
        }
        Ok(infos)
    }

    /// `meds`, plus `meds_{band}` for every band of a multi-band run.
    fn meds_inputs(
        &self,
        infos: &[CoaddInfo],
        info: &CoaddInfo,
    ) -> Result<BTreeMap<String, String>, AppError> {
        let mut inputs = BTreeMap::new();
        let Some(medsconf) = self.config.medsconf.as_deref() else {
            return Ok(inputs);
        };

        let tile = info.tilename.as_str();
        let meds_for = |band: &Band, coadd_run: &str| {
            meds_path(self.desdata, medsconf, coadd_run, tile, band.as_str())
                .to_string_lossy()
                .into_owned()
        };

        if self.config.band.len() == 1 {
            inputs.insert("meds".to_string(), meds_for(&info.band, &info.coadd_run));
            return Ok(inputs);
        }

        let mut all = Vec::with_capacity(self.config.band.len());
        for band in self.config.band.iter() {
            let band_info = find_tile(infos, tile, band).ok_or_else(|| {
                AppError::InputNotFound(format!("coadd of tile {} in band {}", tile, band))
            })?;
            let path = meds_for(band, &band_info.coadd_run);
            inputs.insert(format!("meds_{}", band), path.clone());
            all.push(path);
        }
        inputs.insert("meds".to_string(), all.join(","));
        Ok(inputs)
    }

    /// Unsplit outputs of the detection run for the same tile, as `{ftype}_detband`.
    fn detband_inputs(&self, info: &CoaddInfo) -> Result<BTreeMap<String, String>, AppError> {
        let mut inputs = BTreeMap::new();
        let (Some(detrun), Some(detband)) = (self.detrun, self.config.distinct_detband()) else {
            return Ok(inputs);
        };

        let unit = ProcessingUnit::Tile { tile: info.tilename.clone(), band: detband.clone() };
        for key in detrun.product_keys()? {
            let path = detrun.path(&unit, &key)?;
            inputs.insert(format!("{}_detband", key), path);
        }
        Ok(inputs)
    }

    /// The per-tile list of single-epoch inputs multishear reads.
    ///
    /// One line per source image: the image, then the serun outputs.
    fn srclist_file(
        &self,
        unit: &ProcessingUnit,
        info: &CoaddInfo,
    ) -> Result<RenderedFile, AppError> {
        let serun = self.serun.ok_or_else(|| AppError::config_error("source lists need a serun"))?;
        if info.srclist.is_empty() {
            return Err(AppError::InputNotFound(format!(
                "source list of tile {} in band {}",
                info.tilename, info.band
            )));
        }

        let mut content = String::new();
        for src in &info.srclist {
            let se_unit =
                ProcessingUnit::Exposure { exposure: src.expname.clone(), ccd: src.ccd };
            let mut fields = vec![src.red_image.clone()];
            for key in self.module.serun_inputs {
                fields.push(serun.path(&se_unit, key)?);
            }
            content.push_str(&fields.join(" "));
            content.push('\n');
        }

        let path: PathBuf = self.resolver.resolve_unit(
            &self.config.run,
            &self.config.fileclass,
            unit,
            SRCLIST_TYPE,
            SRCLIST_EXT,
            None,
            RunNaming::Omitted,
        )?;
        Ok(RenderedFile { path, content, executable: false })
    }
}

/// `module unload X && module load X/{vers}` for every module the back-end loads.
pub fn module_load_lines(module: &ModuleSpec, config: &RunConfig) -> Result<Vec<String>, AppError> {
    module
        .module_loads
        .iter()
        .map(|(name, key)| {
            let vers = config.software_version(key).ok_or_else(|| {
                AppError::config_error(format!("run {} records no {}", config.run, key))
            })?;
            let vers = if vers == "trunk" { "work" } else { vers };
            Ok(format!("module unload {} && module load {}/{}", name, name, vers))
        })
        .collect()
}
