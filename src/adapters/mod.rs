pub mod fits_rows;
pub mod json_file_lists;
pub mod run_config_store;
pub mod system_process;
pub mod template_engine;

pub use fits_rows::FitsRowCounter;
pub use json_file_lists::JsonFileListSource;
pub use run_config_store::FilesystemRunConfigStore;
pub use system_process::SystemProcessRunner;
pub use template_engine::TemplateEngine;
