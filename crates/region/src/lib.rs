//! In-memory region for softcache
//!
//! Provides [`MemoryRegion`], a DashMap-backed implementation of the
//! [`softcache_core::Region`] contract. It is the default region for
//! embedded use and the region every test suite runs against.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::{MemoryRegion, RegionStats};
