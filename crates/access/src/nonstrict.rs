//! Nonstrict read-write access
//!
//! No per-key lock object. A mutating transaction removes the region entry
//! before the underlying write is attempted, and removes it again when its
//! completion callback fires, success or failure. Between those two
//! removals a concurrent transaction may repopulate the cache with data the
//! in-flight writer is about to make stale; the mode accepts that window
//! explicitly in exchange for throughput. The next reader repairs it with a
//! fresh load from the system of record — this strategy never rewrites the
//! cache proactively from a local transaction's own write.

use dashmap::DashMap;
use softcache_core::{
    CacheKey, CachedRecord, Entry, Region, Result, SoftLock, TransactionObserver, TxnId, Version,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Invalidation-bracketing access strategy
pub struct NonstrictReadWriteStrategy {
    region: Arc<dyn Region>,
    /// Keys each in-flight transaction invalidated, re-invalidated when its
    /// completion callback fires.
    pending: DashMap<TxnId, Vec<CacheKey>>,
}

impl NonstrictReadWriteStrategy {
    /// Create the strategy over `region`
    pub fn new(region: Arc<dyn Region>) -> Self {
        NonstrictReadWriteStrategy {
            region,
            pending: DashMap::new(),
        }
    }

    /// Pre-invalidation: remove now, remember to remove again at completion.
    ///
    /// The removal is mandatory; a backend failure here propagates, because
    /// leaving the entry in place would let readers see a value the
    /// in-flight write is about to make stale.
    fn invalidate(&self, txn: TxnId, key: &CacheKey) -> Result<()> {
        self.region.remove(key)?;
        let mut keys = self.pending.entry(txn).or_default();
        if !keys.contains(key) {
            keys.push(key.clone());
        }
        Ok(())
    }
}

impl crate::strategy::RegionAccess for NonstrictReadWriteStrategy {
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
        let existing = match self.region.get(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(region = self.region.name(), %key, %err, "load-put skipped");
                return Ok(false);
            }
        };
        let writable = match &existing {
            None => true,
            Some(entry) => version.refreshes(entry.guard_version()),
        };
        if !writable {
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
        txn: TxnId,
        key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
    ) -> Result<bool> {
        self.invalidate(txn, key)?;
        Ok(false)
    }

    fn after_insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
    ) -> Result<bool> {
        // No proactive repopulation; just make sure the completion-side
        // invalidation is registered.
        let mut keys = self.pending.entry(txn).or_default();
        if !keys.contains(key) {
            keys.push(key.clone());
        }
        Ok(false)
    }

    fn update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
        _previous_version: Version,
    ) -> Result<bool> {
        self.invalidate(txn, key)?;
        Ok(false)
    }

    fn after_update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        _previous_version: Version,
        _lock: Option<SoftLock>,
    ) -> Result<bool> {
        self.after_insert(txn, key, record, version)
    }

    fn remove(&self, txn: TxnId, key: &CacheKey) -> Result<()> {
        self.invalidate(txn, key)
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
        // There is no Locked state in this mode
        Ok(None)
    }

    fn unlock_item(&self, _txn: TxnId, _key: &CacheKey, _lock: SoftLock) -> Result<()> {
        Ok(())
    }
}

impl TransactionObserver for NonstrictReadWriteStrategy {
    fn before_completion(&self, _txn: TxnId) -> Result<()> {
        Ok(())
    }

    fn after_completion(&self, txn: TxnId, success: bool) -> Result<()> {
        let Some((_, keys)) = self.pending.remove(&txn) else {
            return Ok(());
        };
        debug!(%txn, success, keys = keys.len(), "post-completion invalidation");
        for (idx, key) in keys.iter().enumerate() {
            // Second leg of the bracketing, regardless of outcome. Mandatory:
            // on failure the unprocessed keys go back into the pending map so
            // a retried delivery can finish the invalidation.
            if let Err(err) = self.region.remove(key) {
                self.pending
                    .entry(txn)
                    .or_default()
                    .extend(keys[idx..].iter().cloned());
                return Err(err);
            }
        }
        Ok(())
    }
}
