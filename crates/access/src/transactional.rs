//! Transactional access
//!
//! Hard locking is delegated to an external two-phase-commit coordinator:
//! the strategy enlists the cache as a participant the first time a
//! transaction touches each key, buffers the transaction's region writes
//! locally, and applies or discards them when the coordinator drives the
//! participant's commit or rollback. Visibility of the pending write is
//! therefore governed by the coordinator's isolation guarantees, not by any
//! lock state machine in this crate: `get` only ever sees committed region
//! state.

use dashmap::DashMap;
use softcache_core::{
    CacheKey, CachedRecord, Coordinator, Entry, Participant, Region, Result, SoftLock,
    TransactionObserver, TxnId, Version,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Pending cache-side work of one enlisted transaction
#[derive(Default)]
struct TxnBuffer {
    writes: HashMap<CacheKey, Entry>,
    removes: HashSet<CacheKey>,
    enlisted: HashSet<CacheKey>,
}

/// State shared between the strategy and its coordinator participant
struct Inner {
    region: Arc<dyn Region>,
    buffers: DashMap<TxnId, TxnBuffer>,
}

impl Inner {
    /// Apply the transaction's buffered writes to the region
    fn apply(&self, txn: TxnId) -> Result<()> {
        let Some((_, buffer)) = self.buffers.remove(&txn) else {
            return Ok(());
        };
        debug!(%txn, writes = buffer.writes.len(), removes = buffer.removes.len(),
            "applying transactional cache writes");
        for (key, entry) in buffer.writes {
            self.region.put(key, entry)?;
        }
        for key in buffer.removes {
            self.region.remove(&key)?;
        }
        Ok(())
    }

    /// Discard the transaction's buffered writes
    fn discard(&self, txn: TxnId) {
        if self.buffers.remove(&txn).is_some() {
            debug!(%txn, "discarded transactional cache writes");
        }
    }
}

/// The cache-side resource handed to the coordinator
struct CacheParticipant {
    inner: Arc<Inner>,
}

impl Participant for CacheParticipant {
    fn prepare(&self, _txn: TxnId) -> Result<()> {
        // Region writes are buffered in memory; nothing can fail before
        // phase two, so the cache always votes yes.
        Ok(())
    }

    fn commit(&self, txn: TxnId) -> Result<()> {
        self.inner.apply(txn)
    }

    fn rollback(&self, txn: TxnId) -> Result<()> {
        self.inner.discard(txn);
        Ok(())
    }
}

/// External-coordinator access strategy
pub struct TransactionalStrategy {
    inner: Arc<Inner>,
    participant: Arc<CacheParticipant>,
    coordinator: Arc<dyn Coordinator>,
    next_lock_id: AtomicU64,
}

impl TransactionalStrategy {
    /// Create the strategy over `region`, enlisting with `coordinator`
    pub fn new(region: Arc<dyn Region>, coordinator: Arc<dyn Coordinator>) -> Self {
        let inner = Arc::new(Inner {
            region,
            buffers: DashMap::new(),
        });
        let participant = Arc::new(CacheParticipant {
            inner: inner.clone(),
        });
        TransactionalStrategy {
            inner,
            participant,
            coordinator,
            next_lock_id: AtomicU64::new(1),
        }
    }

    /// Register `key` with the coordinator the first time `txn` touches it
    fn enlist(&self, txn: TxnId, key: &CacheKey) -> Result<()> {
        let newly = {
            let mut buffer = self.inner.buffers.entry(txn).or_default();
            buffer.enlisted.insert(key.clone())
        };
        if newly {
            self.coordinator
                .enlist(txn, std::slice::from_ref(key), self.participant.clone())?;
        }
        Ok(())
    }

    /// Stage a region write in the transaction's buffer
    fn buffer_write(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        self.enlist(txn, key)?;
        let mut buffer = self.inner.buffers.entry(txn).or_default();
        buffer.removes.remove(key);
        buffer
            .writes
            .insert(key.clone(), Entry::item(record, version));
        Ok(true)
    }
}

impl crate::strategy::RegionAccess for TransactionalStrategy {
    fn get(&self, _txn: TxnId, key: &CacheKey) -> Result<Option<CachedRecord>> {
        match self.inner.region.get(key) {
            Ok(Some(entry)) => Ok(entry.readable().map(|(record, _)| record.clone())),
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(region = self.inner.region.name(), %key, %err, "read degraded to miss");
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
        // Loads carry committed state and bypass the coordinator.
        let existing = match self.inner.region.get(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(region = self.inner.region.name(), %key, %err, "load-put skipped");
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
        match self
            .inner
            .region
            .put(key.clone(), Entry::item(record, version))
        {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(region = self.inner.region.name(), %key, %err, "load-put skipped");
                Ok(false)
            }
        }
    }

    fn insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        self.buffer_write(txn, key, record, version)
    }

    fn after_insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        // Confirmation replaces the staged value with the final one.
        self.buffer_write(txn, key, record, version)
    }

    fn update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        _previous_version: Version,
    ) -> Result<bool> {
        self.buffer_write(txn, key, record, version)
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
        self.buffer_write(txn, key, record, version)
    }

    fn remove(&self, txn: TxnId, key: &CacheKey) -> Result<()> {
        self.enlist(txn, key)?;
        let mut buffer = self.inner.buffers.entry(txn).or_default();
        buffer.writes.remove(key);
        buffer.removes.insert(key.clone());
        Ok(())
    }

    fn evict(&self, key: &CacheKey) -> Result<()> {
        self.inner.region.remove(key)
    }

    fn lock_item(&self, txn: TxnId, key: &CacheKey, _version: Version) -> Result<Option<SoftLock>> {
        // "Locking" here means registering participation; the coordinator
        // owns acquisition and visibility timing.
        self.enlist(txn, key)?;
        let lock_id = self.next_lock_id.fetch_add(1, Ordering::SeqCst);
        Ok(Some(SoftLock::new(key.clone(), txn, lock_id)))
    }

    fn unlock_item(&self, _txn: TxnId, _key: &CacheKey, _lock: SoftLock) -> Result<()> {
        // Release rides on the coordinator's phase-two outcome.
        Ok(())
    }
}

impl TransactionObserver for TransactionalStrategy {
    fn before_completion(&self, _txn: TxnId) -> Result<()> {
        Ok(())
    }

    fn after_completion(&self, txn: TxnId, success: bool) -> Result<()> {
        // Normally the coordinator has already driven the participant and
        // the buffer is gone. The fallback covers local-only completion.
        if success {
            self.inner.apply(txn)
        } else {
            self.inner.discard(txn);
            Ok(())
        }
    }
}
