mod fake_file_lists;
mod fake_row_counts;
mod memory_run_configs;
mod recording_runner;

pub use fake_file_lists::FakeFileLists;
pub use fake_row_counts::FakeRowCounts;
pub use memory_run_configs::MemoryRunConfigStore;
pub use recording_runner::RecordingRunner;
