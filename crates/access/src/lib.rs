//! Access strategies for softcache
//!
//! This crate implements the four cache concurrency policies behind a single
//! operation set:
//! - `ReadOnlyStrategy`: insert-once population, updates are illegal
//! - `ReadWriteStrategy`: per-key soft locking with rollback restoration
//! - `NonstrictReadWriteStrategy`: remove-then-remove invalidation bracketing
//! - `TransactionalStrategy`: thin adapter over an external 2PC coordinator
//!
//! [`AccessStrategy`] is the closed dispatch over the four, selected once per
//! cacheable type at configuration-resolution time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod latch;
pub mod nonstrict;
pub mod read_only;
pub mod read_write;
pub mod strategy;
pub mod transactional;

pub use config::{CacheConfig, EntityCacheConfig, ResolvedEntityCache};
pub use nonstrict::NonstrictReadWriteStrategy;
pub use read_only::ReadOnlyStrategy;
pub use read_write::ReadWriteStrategy;
pub use strategy::{AccessStrategy, RegionAccess};
pub use transactional::TransactionalStrategy;
