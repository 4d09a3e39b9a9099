//! Region contract
//!
//! A region is a named, unbounded key/value store owned by the cache
//! provider. The contract assumes nothing beyond per-call semantics: no
//! ordering or atomicity guarantees across keys or across calls. The access
//! strategies layer their own per-key discipline on top.
//!
//! Regions are injected, shared, externally-owned dependencies. The crate
//! holds no hidden global state, which keeps strategies testable against an
//! in-memory region.

use crate::entry::Entry;
use crate::error::Result;
use crate::key::CacheKey;

/// Named key/value cache store external to this crate
///
/// All methods may fail with a backend-unavailable condition
/// ([`crate::Error::Region`]). Strategies translate such failures into
/// "treat as miss" for reads and "skip, log, continue" for best-effort
/// writes; failures during a mandatory invalidation or lock-maintenance
/// step are propagated instead, because skipping those would allow stale
/// reads indefinitely.
pub trait Region: Send + Sync {
    /// The region's configured name
    fn name(&self) -> &str;

    /// Fetch the entry stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend is unavailable.
    fn get(&self, key: &CacheKey) -> Result<Option<Entry>>;

    /// Store `entry` under `key`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend is unavailable.
    fn put(&self, key: CacheKey, entry: Entry) -> Result<()>;

    /// Remove the entry stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend is unavailable.
    fn remove(&self, key: &CacheKey) -> Result<()>;

    /// Remove every entry in the region
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend is unavailable.
    fn clear(&self) -> Result<()>;
}
