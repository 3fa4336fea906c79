//! `wlpipe path`

use clap::Args;

use crate::app::commands::path::{PathOptions, execute};
use crate::domain::{AppError, Chunk, FileClass, ProcessingKind, RunId, Settings, UnitSpec};

#[derive(Args)]
pub struct PathArgs {
    /// Run tag, e.g. se014i
    run: String,
    /// Processing kind: se or me
    kind: ProcessingKind,
    /// File type tag, e.g. shear
    filetype: String,
    /// Root sub-tree, e.g. red, coadd or am
    #[arg(long, default_value = FileClass::WLPIPE)]
    fileclass: String,
    /// Exposure name (se)
    #[arg(long)]
    exposure: Option<String>,
    /// CCD number (se)
    #[arg(long)]
    ccd: Option<String>,
    /// Tile name (me)
    #[arg(long)]
    tile: Option<String>,
    /// Band (me)
    #[arg(long)]
    band: Option<String>,
    /// Extension; the file type's default when omitted
    #[arg(long)]
    ext: Option<String>,
    /// First object of a sub-range (me)
    #[arg(long, requires = "end")]
    start: Option<u64>,
    /// Last object of a sub-range, inclusive
    #[arg(long, requires = "start")]
    end: Option<u64>,
    /// Leave the run out of the file name (me)
    #[arg(long)]
    no_run: bool,
    /// Also accept this module's file types
    #[arg(long)]
    module: Option<String>,
    /// Create the parent directory
    #[arg(long)]
    mkdir: bool,
}

pub fn run_path(settings: &Settings, args: PathArgs) -> Result<(), AppError> {
    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => Some(Chunk::new(start, end)?),
        _ => None,
    };
    let options = PathOptions {
        run: RunId::new(&args.run)?,
        fileclass: FileClass::new(&args.fileclass)?,
        kind: args.kind,
        unit: UnitSpec { exposure: args.exposure, ccd: args.ccd, tile: args.tile, band: args.band },
        filetype: args.filetype,
        ext: args.ext,
        range,
        omit_run: args.no_run,
        module: args.module,
        mkdir: args.mkdir,
    };

    let path = execute(settings.paths.desdata().to_path_buf(), &options)?;
    println!("{}", path.display());
    Ok(())
}
