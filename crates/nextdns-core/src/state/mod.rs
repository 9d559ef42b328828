// # State Store Implementations
//
// Orchestrator-side persistence of managed resource records, used by the
// host binary and by tests.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;
