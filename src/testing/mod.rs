pub mod fixtures;
pub mod ports;

#[allow(unused_imports)]
pub use ports::FakeFileLists;
#[allow(unused_imports)]
pub use ports::FakeRowCounts;
#[allow(unused_imports)]
pub use ports::MemoryRunConfigStore;
#[allow(unused_imports)]
pub use ports::RecordingRunner;
