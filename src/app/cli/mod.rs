//! CLI Adapter.

mod jobs;
mod path;
mod runconfig;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::{
    FilesystemRunConfigStore, FitsRowCounter, JsonFileListSource, SystemProcessRunner,
    TemplateEngine,
};
use crate::app::AppContext;
use crate::app::config::load_settings;
use crate::app::logging::init_logging;
use crate::domain::{AppError, Scheduler, Settings};

#[derive(Parser)]
#[command(name = "wlpipe")]
#[command(version)]
#[command(
    about = "Generate, run and check DES weak-lensing pipeline jobs",
    long_about = None
)]
struct Cli {
    /// Settings file (defaults to $WLPIPE_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more; repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the path of one output file
    Path(path::PathArgs),
    /// Split a catalog of NROW rows into chunks of at most NPER
    Chunks {
        nrow: u64,
        nper: u64,
        /// Print a JSON array instead of `start end` lines
        #[arg(long)]
        json: bool,
    },
    /// Create or show run configurations
    #[clap(visible_alias = "rc")]
    Runconfig {
        #[command(subcommand)]
        command: runconfig::RunconfigCommands,
    },
    /// List the built-in modules
    Modules {
        #[arg(long)]
        json: bool,
    },
    /// Write job scripts, scheduler files and the job manifest for a run
    #[clap(visible_alias = "g")]
    Generate {
        /// Run tag, e.g. se014i
        run: String,
        #[arg(short, long, default_value = "pbs")]
        scheduler: Scheduler,
        /// Only jobs with missing outputs
        #[arg(long)]
        missing: bool,
        /// Restrict a tile run to one tile
        #[arg(long)]
        tile: Option<String>,
        /// Build everything but write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Run one job from its meta JSON
    Process {
        /// The job's meta file
        meta: PathBuf,
    },
    /// Classify the jobs of a run and write its good and bad lists
    Check {
        /// Run tag, e.g. se014i
        run: String,
    },
}

type SystemContext =
    AppContext<JsonFileListSource, FitsRowCounter, FilesystemRunConfigStore, SystemProcessRunner>;

fn system_context(settings: Settings) -> Result<SystemContext, AppError> {
    let file_lists = JsonFileListSource::new(settings.paths.file_lists());
    let runconfigs = FilesystemRunConfigStore::new(settings.paths.runconfig_dir());
    Ok(AppContext::new(
        settings,
        file_lists,
        FitsRowCounter::new(),
        runconfigs,
        SystemProcessRunner::new(),
        TemplateEngine::new()?,
    ))
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_settings(cli.config.as_deref())
        .and_then(system_context)
        .and_then(|ctx| dispatch(&ctx, cli.command));

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn dispatch(ctx: &SystemContext, command: Commands) -> Result<i32, AppError> {
    match command {
        Commands::Path(args) => path::run_path(ctx.settings(), args).map(|_| 0),
        Commands::Chunks { nrow, nper, json } => run_chunks(nrow, nper, json).map(|_| 0),
        Commands::Runconfig { command } => runconfig::run_runconfig(ctx, command).map(|_| 0),
        Commands::Modules { json } => run_modules(json).map(|_| 0),
        Commands::Generate { run, scheduler, missing, tile, dry_run } => {
            jobs::run_generate(ctx, &run, scheduler, missing, tile, dry_run).map(|_| 0)
        }
        Commands::Process { meta } => jobs::run_process(ctx, &meta),
        Commands::Check { run } => jobs::run_check(ctx, &run),
    }
}

fn run_chunks(nrow: u64, nper: u64, json: bool) -> Result<(), AppError> {
    let chunks = crate::domain::chunks(nrow, nper)?;
    if json {
        let out = serde_json::to_string(&chunks).map_err(|e| AppError::parse_error("chunks", e))?;
        println!("{}", out);
    } else {
        for chunk in chunks {
            println!("{} {}", chunk.start, chunk.end);
        }
    }
    Ok(())
}

fn run_modules(json: bool) -> Result<(), AppError> {
    let modules = crate::app::commands::modules::execute();
    if json {
        let out = serde_json::to_string_pretty(&modules)
            .map_err(|e| AppError::parse_error("modules", e))?;
        println!("{}", out);
        return Ok(());
    }

    for module in modules {
        let detband = if module.uses_detband { ", reads detection band" } else { "" };
        println!("{} ({}): {}{}", module.name, module.kind, module.timing, detband);
        println!("  outputs: {}", module.filetypes.join(" "));
    }
    Ok(())
}
