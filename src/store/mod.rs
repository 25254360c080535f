//! Entry storage tiers.
//!
//! - [`memory`]: bounded FIFO-with-renewal map, the hot tier
//! - [`disk`]: digest-addressed sharded file tree, the spill tier

pub mod disk;
pub mod memory;

pub use disk::{DiskStats, DiskStore, StorageError};
pub use memory::MemoryStore;
