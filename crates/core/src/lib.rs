//! Core types and traits for softcache
//!
//! This crate defines the foundational types used throughout the system:
//! - CacheKey: Composite identity addressing one cached record in a region
//! - CachedRecord / Version: Opaque record snapshot plus its freshness marker
//! - AccessType: The four cache concurrency policies and their resolution
//! - Entry / LockState / SoftLock: Region entry wrapper and soft-lock state
//! - TxnId / TransactionObserver: Transaction identity and boundary callbacks
//! - Region: The external key/value cache store contract
//! - Coordinator / Participant: External two-phase commit hooks
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod access_type;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod key;
pub mod record;
pub mod region;
pub mod txn;

// Re-export commonly used types and traits
pub use access_type::AccessType;
pub use coordinator::{Coordinator, Participant};
pub use entry::{now_millis, Entry, LockState, SoftLock};
pub use error::{Error, Result};
pub use key::{CacheKey, PkValue};
pub use record::{CachedRecord, Version};
pub use region::Region;
pub use txn::{TransactionObserver, TxnId};
