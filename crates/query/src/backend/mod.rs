//! Query executor implementations.

mod memory;

pub use memory::MemoryBackend;
