//! Read-write access with soft locking
//!
//! The strategy keeps one invariant above all others: a region entry is
//! either a readable record or a lock tombstone, never both. Readers never
//! see a half-written value, writers never block each other indefinitely,
//! and a rolled-back writer leaves no corrupted entry.
//!
//! Per-key state machine:
//!
//! ```text
//! Unlocked(record?) --write-begin--> Locked(owner, lock_id, multiplicity, saved?)
//! Locked --owner confirms (after_insert/after_update)--> Unlocked(new record)
//! Locked --owner releases without confirming--> Unlocked(saved record?) restored
//! ```
//!
//! Contention is resolved by forced miss, never by blocking: a `get` against
//! a locked key returns nothing and the caller falls through to the system
//! of record. A transaction that tries to lock a key another transaction
//! already holds receives its own token, but the entry stays owned by the
//! first holder and the second writer's eventual completion is discarded.
//!
//! Completion-time writes are guarded by the version tie-break: the last
//! transaction to complete wins unless its version fails to exceed the
//! stored one, so an old transaction that commits late cannot clobber a
//! newer cached value.

use crate::latch::KeyLatches;
use dashmap::DashMap;
use softcache_core::{
    CacheKey, CachedRecord, Entry, LockState, Region, Result, SoftLock, TransactionObserver,
    TxnId, Version,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Soft-locking access strategy
pub struct ReadWriteStrategy {
    region: Arc<dyn Region>,
    latches: KeyLatches,
    next_lock_id: AtomicU64,
    /// Locks each in-flight transaction still holds, released (with
    /// rollback restoration) when its completion callback fires.
    held: DashMap<TxnId, Vec<SoftLock>>,
}

impl ReadWriteStrategy {
    /// Create the strategy over `region`
    pub fn new(region: Arc<dyn Region>) -> Self {
        ReadWriteStrategy {
            region,
            latches: KeyLatches::new(),
            next_lock_id: AtomicU64::new(1),
            held: DashMap::new(),
        }
    }

    fn next_lock_id(&self) -> u64 {
        self.next_lock_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Transition `key` towards Locked on behalf of `txn`.
    ///
    /// Caller must hold the key's latch. Region failures propagate: lock
    /// placement is mandatory bookkeeping, skipping it would let readers see
    /// a value an in-flight write is about to invalidate.
    fn acquire(&self, txn: TxnId, key: &CacheKey) -> Result<SoftLock> {
        let token = match self.region.get(key)? {
            None => {
                let lock_id = self.next_lock_id();
                self.region
                    .put(key.clone(), Entry::Locked(LockState::new(txn, lock_id)))?;
                SoftLock::new(key.clone(), txn, lock_id)
            }
            Some(Entry::Item {
                record, version, ..
            }) => {
                let lock_id = self.next_lock_id();
                self.region.put(
                    key.clone(),
                    Entry::Locked(LockState::displacing(txn, lock_id, record, version)),
                )?;
                SoftLock::new(key.clone(), txn, lock_id)
            }
            Some(Entry::Locked(mut state)) => {
                if state.owner == txn {
                    // Re-entrant hold; same credential, deeper multiplicity.
                    state.multiplicity += 1;
                    let lock_id = state.lock_id;
                    self.region.put(key.clone(), Entry::Locked(state))?;
                    SoftLock::new(key.clone(), txn, lock_id)
                } else {
                    // Contended. The entry stays owned by the first holder;
                    // the requester gets a distinct token that cannot
                    // release it.
                    debug!(%key, holder = %state.owner, requester = %txn, "lock contention");
                    state.contended = true;
                    self.region.put(key.clone(), Entry::Locked(state))?;
                    SoftLock::new(key.clone(), txn, self.next_lock_id())
                }
            }
        };
        self.held.entry(txn).or_default().push(token.clone());
        Ok(token)
    }

    /// Release one hold on a locked entry: decrement multiplicity, or
    /// restore the saved readable value (removing the entry if none).
    ///
    /// Caller must hold the key's latch.
    fn release_locked(&self, key: &CacheKey, mut state: LockState) -> Result<()> {
        if state.multiplicity > 1 {
            state.multiplicity -= 1;
            self.region.put(key.clone(), Entry::Locked(state))
        } else {
            match state.saved {
                Some((record, version)) => {
                    self.region.put(key.clone(), Entry::item(record, version))
                }
                None => self.region.remove(key),
            }
        }
    }

    /// Drop one tracked hold of `txn` on `key`
    fn forget_one(&self, txn: TxnId, key: &CacheKey) {
        if let Some(mut tokens) = self.held.get_mut(&txn) {
            if let Some(pos) = tokens.iter().position(|t| t.key() == key) {
                tokens.remove(pos);
            }
        }
    }

    /// Completion-side write shared by `after_insert` and `after_update`.
    ///
    /// Caller must hold the key's latch. `token` carries the credential for
    /// updates; inserts authorize by ownership alone.
    fn complete_write(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        token: Option<&SoftLock>,
    ) -> Result<bool> {
        match self.region.get(key)? {
            Some(Entry::Locked(mut state)) => {
                let authorized = match token {
                    Some(token) => state.unlockable_by(token),
                    None => state.owner == txn,
                };
                if !authorized {
                    // A writer that lost the lock race completes here: its
                    // write is discarded, the holder's lock is untouched.
                    debug!(%key, holder = %state.owner, completer = %txn, "discarding contended write");
                    self.forget_one(txn, key);
                    return Ok(false);
                }
                if version.supersedes(state.guard_version()) {
                    if state.multiplicity > 1 {
                        state.multiplicity -= 1;
                        state.saved = Some((record, version));
                        self.region.put(key.clone(), Entry::Locked(state))?;
                    } else {
                        self.region.put(key.clone(), Entry::item(record, version))?;
                    }
                    self.forget_one(txn, key);
                    Ok(true)
                } else {
                    // Stale completion: drop the write, release the hold so
                    // the newer saved value becomes readable again.
                    debug!(%key, %version, guard = %state.guard_version(), "discarding stale write");
                    self.release_locked(key, state)?;
                    self.forget_one(txn, key);
                    Ok(false)
                }
            }
            Some(Entry::Item {
                version: stored, ..
            }) => {
                // Lock already gone; apply only if the write still wins.
                if version.supersedes(stored) {
                    self.region.put(key.clone(), Entry::item(record, version))?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            None => {
                self.region.put(key.clone(), Entry::item(record, version))?;
                Ok(true)
            }
        }
    }
}

impl crate::strategy::RegionAccess for ReadWriteStrategy {
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
        let _guard = self.latches.guard(key);
        let existing = match self.region.get(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(region = self.region.name(), %key, %err, "load-put skipped");
                return Ok(false);
            }
        };
        let writable = match &existing {
            None => true,
            // Never overwrite a pending write with a stale load.
            Some(Entry::Locked(_)) => false,
            Some(Entry::Item {
                version: stored, ..
            }) => version.refreshes(*stored),
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
        let _guard = self.latches.guard(key);
        self.acquire(txn, key)?;
        Ok(true)
    }

    fn after_insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        let _guard = self.latches.guard(key);
        self.complete_write(txn, key, record, version, None)
    }

    fn update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        _record: CachedRecord,
        _version: Version,
        _previous_version: Version,
    ) -> Result<bool> {
        let _guard = self.latches.guard(key);
        self.acquire(txn, key)?;
        Ok(true)
    }

    fn after_update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        _previous_version: Version,
        lock: Option<SoftLock>,
    ) -> Result<bool> {
        let _guard = self.latches.guard(key);
        self.complete_write(txn, key, record, version, lock.as_ref())
    }

    fn remove(&self, _txn: TxnId, key: &CacheKey) -> Result<()> {
        let _guard = self.latches.guard(key);
        self.region.remove(key)
    }

    fn evict(&self, key: &CacheKey) -> Result<()> {
        let _guard = self.latches.guard(key);
        self.region.remove(key)
    }

    fn lock_item(&self, txn: TxnId, key: &CacheKey, _version: Version) -> Result<Option<SoftLock>> {
        let _guard = self.latches.guard(key);
        self.acquire(txn, key).map(Some)
    }

    fn unlock_item(&self, txn: TxnId, key: &CacheKey, lock: SoftLock) -> Result<()> {
        let _guard = self.latches.guard(key);
        match self.region.get(key)? {
            Some(Entry::Locked(state)) if state.unlockable_by(&lock) => {
                self.release_locked(key, state)?;
            }
            // Already released (rollback path, eviction, or a contender's
            // token): accepted silently.
            _ => debug!(%key, "unlock without matching lock"),
        }
        self.forget_one(txn, key);
        Ok(())
    }
}

impl TransactionObserver for ReadWriteStrategy {
    fn before_completion(&self, _txn: TxnId) -> Result<()> {
        Ok(())
    }

    fn after_completion(&self, txn: TxnId, success: bool) -> Result<()> {
        let Some((_, tokens)) = self.held.remove(&txn) else {
            return Ok(());
        };
        debug!(%txn, success, outstanding = tokens.len(), "releasing locks at completion");
        for (idx, token) in tokens.iter().enumerate() {
            let _guard = self.latches.guard(token.key());
            let released = match self.region.get(token.key()) {
                Ok(Some(Entry::Locked(state))) if state.unlockable_by(token) => {
                    self.release_locked(token.key(), state)
                }
                Ok(_) => Ok(()),
                Err(err) => Err(err),
            };
            // Lock release is mandatory: on failure the unreleased tokens go
            // back into the held map so a retried delivery can finish.
            if let Err(err) = released {
                self.held
                    .entry(txn)
                    .or_default()
                    .extend(tokens[idx..].iter().cloned());
                return Err(err);
            }
        }
        Ok(())
    }
}
