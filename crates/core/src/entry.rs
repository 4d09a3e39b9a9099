//! Region entry wrapper and soft-lock state
//!
//! Under the locking and invalidation policies, a region value is either a
//! readable cached record or a locked/invalid tombstone, never both. The
//! [`Entry`] tagged union enforces that invariant by construction: the lock
//! state lives inside the entry itself, not in a side table.

use crate::key::CacheKey;
use crate::record::{CachedRecord, Version};
use crate::txn::TxnId;
use serde::{Deserialize, Serialize};

/// Epoch milliseconds, used for lock and load timestamps
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Token handed to a caller when it soft-locks a key
///
/// The token records which transaction requested the lock and the lock id
/// it was issued. It must be presented back at unlock time; presenting a
/// token after the lock was already released automatically (for example on
/// rollback) is accepted silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftLock {
    key: CacheKey,
    owner: TxnId,
    lock_id: u64,
}

impl SoftLock {
    /// Create a lock token
    pub fn new(key: CacheKey, owner: TxnId, lock_id: u64) -> Self {
        SoftLock {
            key,
            owner,
            lock_id,
        }
    }

    /// The key this token was issued for
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// The transaction that requested the lock
    pub fn owner(&self) -> TxnId {
        self.owner
    }

    /// The issued lock id
    pub fn lock_id(&self) -> u64 {
        self.lock_id
    }
}

/// Per-key soft-lock state stored inside a region entry
///
/// At most one distinct transaction owns the outstanding lock for a key at
/// a time. Re-entrant locking by the owner increments `multiplicity` rather
/// than duplicating the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    /// Transaction owning the lock
    pub owner: TxnId,
    /// Monotonic id issued when the key transitioned to locked
    pub lock_id: u64,
    /// Re-entrant hold count by the owning transaction
    pub multiplicity: u32,
    /// Epoch milliseconds when the lock was taken. Not used for expiry by
    /// this crate; recorded so an external reaper can be layered on top.
    pub locked_at: i64,
    /// The readable value displaced by the lock, restored on rollback.
    /// Also holds the pending confirmed value while multiplicity > 1.
    pub saved: Option<(CachedRecord, Version)>,
    /// True once another transaction attempted to lock this key too
    pub contended: bool,
}

impl LockState {
    /// Lock an unoccupied key
    pub fn new(owner: TxnId, lock_id: u64) -> Self {
        LockState {
            owner,
            lock_id,
            multiplicity: 1,
            locked_at: now_millis(),
            saved: None,
            contended: false,
        }
    }

    /// Lock a key that currently holds a readable value, remembering it for
    /// rollback restoration
    pub fn displacing(owner: TxnId, lock_id: u64, record: CachedRecord, version: Version) -> Self {
        LockState {
            saved: Some((record, version)),
            ..LockState::new(owner, lock_id)
        }
    }

    /// The version guarding completion-time writes: the saved value's
    /// version, or the unversioned marker if nothing is saved
    pub fn guard_version(&self) -> Version {
        self.saved.as_ref().map(|(_, v)| *v).unwrap_or(Version::ZERO)
    }

    /// True if `token` is the credential that may release this lock
    ///
    /// Ownership and lock id must both match: a token issued to a contending
    /// transaction carries a different id and cannot disturb the holder.
    pub fn unlockable_by(&self, token: &SoftLock) -> bool {
        self.owner == token.owner() && self.lock_id == token.lock_id()
    }
}

/// A region value: either a readable cached record or a lock tombstone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// A readable cached record
    Item {
        /// The cached snapshot
        record: CachedRecord,
        /// Version attached to the snapshot (ZERO if unversioned)
        version: Version,
        /// Epoch milliseconds when the snapshot was stored
        stored_at: i64,
    },
    /// An in-flight write made the key unreadable
    Locked(LockState),
}

impl Entry {
    /// Build a readable entry, stamping it with the current time
    pub fn item(record: CachedRecord, version: Version) -> Self {
        Entry::Item {
            record,
            version,
            stored_at: now_millis(),
        }
    }

    /// True if the entry may be served to readers
    pub fn is_readable(&self) -> bool {
        matches!(self, Entry::Item { .. })
    }

    /// The readable record and its version, if the entry is not locked
    pub fn readable(&self) -> Option<(&CachedRecord, Version)> {
        match self {
            Entry::Item {
                record, version, ..
            } => Some((record, *version)),
            Entry::Locked(_) => None,
        }
    }

    /// The version guarding replacement of this entry
    ///
    /// For a readable entry this is the stored version; for a locked entry
    /// it is the lock's guard version (the displaced or pending value).
    pub fn guard_version(&self) -> Version {
        match self {
            Entry::Item { version, .. } => *version,
            Entry::Locked(state) => state.guard_version(),
        }
    }
}
