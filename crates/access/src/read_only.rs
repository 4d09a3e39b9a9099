//! Read-only access
//!
//! Records cached under this policy are assumed immutable by the mapping
//! layer's contract: they may be added and removed, never mutated. Skipping
//! the soft-lock machinery entirely is the whole performance benefit of the
//! mode, so `lock_item`/`unlock_item` are no-ops and an attempted update is
//! reported as a programming error, not a transient failure.

use softcache_core::{
    CacheKey, CachedRecord, Entry, Error, Region, Result, SoftLock, TransactionObserver, TxnId,
    Version,
};
use std::sync::Arc;
use tracing::warn;

/// Insert-once access strategy
pub struct ReadOnlyStrategy {
    region: Arc<dyn Region>,
}

impl ReadOnlyStrategy {
    /// Create the strategy over `region`
    pub fn new(region: Arc<dyn Region>) -> Self {
        ReadOnlyStrategy { region }
    }

    fn illegal_update(&self) -> Error {
        Error::illegal(format!(
            "update of a record cached read-only in region {:?}",
            self.region.name()
        ))
    }
}

impl crate::strategy::RegionAccess for ReadOnlyStrategy {
    fn get(&self, _txn: TxnId, key: &CacheKey) -> Result<Option<CachedRecord>> {
        match self.region.get(key) {
            Ok(Some(entry)) => Ok(entry.readable().map(|(record, _)| record.clone())),
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(region = self.region.name(), %key, %err, "read degraded to miss");
                Ok(None)
            }
        }
    }

    fn put_from_load(
        &self,
        _txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        // Minimal put: an existing entry is never replaced under this policy.
        let existing = match self.region.get(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(region = self.region.name(), %key, %err, "load-put skipped");
                return Ok(false);
            }
        };
        if existing.is_some() {
            return Ok(false);
        }
        match self.region.put(key.clone(), Entry::item(record, version)) {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(region = self.region.name(), %key, %err, "load-put skipped");
                Ok(false)
            }
        }
    }

    fn insert(
        &self,
        _txn: TxnId,
        _key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
    ) -> Result<bool> {
        // Population waits for after_insert, when the underlying insert is
        // known to have succeeded.
        Ok(false)
    }

    fn after_insert(
        &self,
        _txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        if self.region.get(key)?.is_some() {
            return Ok(false);
        }
        self.region.put(key.clone(), Entry::item(record, version))?;
        Ok(true)
    }

    fn update(
        &self,
        _txn: TxnId,
        _key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
        _previous_version: Version,
    ) -> Result<bool> {
        Err(self.illegal_update())
    }

    fn after_update(
        &self,
        _txn: TxnId,
        _key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
        _previous_version: Version,
        _lock: Option<SoftLock>,
    ) -> Result<bool> {
        Err(self.illegal_update())
    }

    fn remove(&self, _txn: TxnId, key: &CacheKey) -> Result<()> {
        self.region.remove(key)
    }

    fn evict(&self, key: &CacheKey) -> Result<()> {
        self.region.remove(key)
    }

    fn lock_item(
        &self,
        _txn: TxnId,
        _key: &CacheKey,
        _version: Version,
    ) -> Result<Option<SoftLock>> {
        // Nothing to protect
        Ok(None)
    }

    fn unlock_item(&self, _txn: TxnId, _key: &CacheKey, _lock: SoftLock) -> Result<()> {
        Ok(())
    }
}

impl TransactionObserver for ReadOnlyStrategy {
    fn before_completion(&self, _txn: TxnId) -> Result<()> {
        Ok(())
    }

    fn after_completion(&self, _txn: TxnId, _success: bool) -> Result<()> {
        Ok(())
    }
}
