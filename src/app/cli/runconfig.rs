//! `wlpipe runconfig`

use clap::Subcommand;

use crate::app::AppContext;
use crate::app::commands::runconfig::{NewRunOptions, create, show};
use crate::domain::{AppError, Band, Bands, RunConfig, RunConfigRequest, RunId, RunType};
use crate::ports::{FileListSource, ProcessRunner, RowCountSource, RunConfigStore};

#[derive(Subcommand)]
pub enum RunconfigCommands {
    /// Create a run configuration, naming it unless --run is given
    New {
        /// sse, sme, am, impyp, eyeball, im3shape, gmix_fit_meds or gmix_mcmc_meds
        run_type: RunType,
        #[arg(long)]
        dataset: String,
        /// Comma separated bands; the first names the run
        #[arg(long)]
        band: Bands,
        #[arg(long)]
        run: Option<String>,
        /// Name a test run
        #[arg(long)]
        test: bool,
        #[arg(long)]
        wl_config: Option<String>,
        #[arg(long)]
        serun: Option<String>,
        /// Objects per chunk for tile runs
        #[arg(long)]
        nper: Option<u64>,
        #[arg(long)]
        medsconf: Option<String>,
        #[arg(long)]
        detrun: Option<String>,
        #[arg(long)]
        detband: Option<String>,
        #[arg(long, requires = "nodes")]
        ppn: Option<u32>,
        #[arg(long, requires = "ppn")]
        nodes: Option<u32>,
        #[arg(long)]
        queue: Option<String>,
        /// Recorded as the run's `version`
        #[arg(long)]
        software_version: Option<String>,
        /// Back-end configuration name, recorded as `config`
        #[arg(long)]
        module_config: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        /// Print the config without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a run configuration
    Show { run: String },
}

pub fn run_runconfig<F, R, S, P>(
    ctx: &AppContext<F, R, S, P>,
    command: RunconfigCommands,
) -> Result<(), AppError>
where
    F: FileListSource,
    R: RowCountSource,
    S: RunConfigStore,
    P: ProcessRunner,
{
    match command {
        RunconfigCommands::New {
            run_type,
            dataset,
            band,
            run,
            test,
            wl_config,
            serun,
            nper,
            medsconf,
            detrun,
            detband,
            ppn,
            nodes,
            queue,
            software_version,
            module_config,
            comment,
            dry_run,
        } => {
            let mut request = RunConfigRequest::new(run_type, dataset, band);
            request.wl_config = wl_config;
            request.serun = serun.as_deref().map(RunId::new).transpose()?;
            request.nper = nper;
            request.medsconf = medsconf;
            request.detrun = detrun.as_deref().map(RunId::new).transpose()?;
            request.detband = detband.as_deref().map(Band::new).transpose()?;
            request.comment = comment;

            let mut options = NewRunOptions::new(request);
            options.run = run.as_deref().map(RunId::new).transpose()?;
            options.test = test;
            options.ppn = ppn;
            options.nodes = nodes;
            options.queue = queue;
            options.version = software_version;
            options.config = module_config;
            options.dry_run = dry_run;

            let config = create(ctx.runconfigs(), options, |key| std::env::var(key).ok())?;
            if dry_run {
                print_config(&config)?;
            } else {
                println!("✅ Created run config {}", config.run);
            }
            Ok(())
        }
        RunconfigCommands::Show { run } => {
            print_config(&show(ctx.runconfigs(), &RunId::new(&run)?)?)
        }
    }
}

fn print_config(config: &RunConfig) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::parse_error("run config", e))?;
    println!("{}", out);
    Ok(())
}
