//! softcache: transaction-aware concurrency control for a shared cache
//!
//! This facade re-exports the public API of the workspace crates:
//! - `softcache-core`: keys, records, versions, access types, the region
//!   and coordinator contracts, soft-lock state, errors
//! - `softcache-region`: the in-memory region implementation
//! - `softcache-access`: the four access strategies and configuration
//!
//! # Example
//!
//! ```
//! use softcache::{
//!     AccessStrategy, AccessType, CacheKey, CachedRecord, MemoryRegion, RegionAccess,
//!     TransactionObserver, TxnId, Version,
//! };
//! use std::sync::Arc;
//!
//! let region = Arc::new(MemoryRegion::new("orders"));
//! let strategy =
//!     AccessStrategy::for_access_type(AccessType::ReadWrite, region, None).unwrap();
//!
//! let txn = TxnId::new();
//! let key = CacheKey::new("Order", 42);
//!
//! strategy
//!     .put_from_load(txn, &key, CachedRecord::new(b"row".to_vec()), Version::new(1))
//!     .unwrap();
//! assert!(strategy.get(txn, &key).unwrap().is_some());
//!
//! // A write in flight forces concurrent readers to miss
//! strategy.lock_item(txn, &key, Version::new(1)).unwrap();
//! assert!(strategy.get(TxnId::new(), &key).unwrap().is_none());
//!
//! // Rollback restores the displaced value
//! strategy.after_completion(txn, false).unwrap();
//! assert!(strategy.get(txn, &key).unwrap().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use softcache_access::{
    AccessStrategy, CacheConfig, EntityCacheConfig, NonstrictReadWriteStrategy, ReadOnlyStrategy,
    ReadWriteStrategy, RegionAccess, ResolvedEntityCache, TransactionalStrategy,
};
pub use softcache_core::{
    now_millis, AccessType, CacheKey, CachedRecord, Coordinator, Entry, Error, LockState,
    Participant, PkValue, Region, Result, SoftLock, TransactionObserver, TxnId, Version,
};
pub use softcache_region::{MemoryRegion, RegionStats};
