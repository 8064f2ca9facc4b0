//! Cache store implementations.

pub mod disk;
pub mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;
