pub mod chunks;
pub mod coadd_info;
pub mod error;
pub mod identifiers;
pub mod job;
pub mod module_spec;
pub mod naming;
pub mod run_config;
pub mod scheduler;
pub mod settings;
pub mod status;
pub mod walltime;

pub use chunks::{Chunk, ChunkError, chunks};
pub use coadd_info::{CoaddInfo, CoaddInfoCache, RedInfo, SrcEntry};
pub use error::AppError;
pub use identifiers::{Band, ExposureName, FileClass, RunId, TileName};
pub use job::{JobManifest, JobRecord};
pub use module_spec::{ModuleSpec, builtin_modules, find_module};
pub use naming::{
    Ccd, FileTypeRegistry, FileTypeSpec, NamingError, PathRequest, PathResolver, ProcessingKind,
    ProcessingUnit, RunNaming, SubmitLayout, UnitSpec,
};
pub use run_config::{Bands, RunConfig, RunConfigError, RunConfigRequest, RunType};
pub use scheduler::Scheduler;
pub use settings::{PathSettings, SchedulerSettings, Settings};
pub use status::{JobOutcome, JobStatus};
