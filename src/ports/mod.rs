mod file_list_source;
mod process_runner;
mod row_count_source;
mod run_config_store;

pub use file_list_source::FileListSource;
pub use process_runner::{ProcessRequest, ProcessRunner};
pub use row_count_source::RowCountSource;
pub use run_config_store::RunConfigStore;
