//! Shared operation set and closed strategy dispatch
//!
//! [`RegionAccess`] is the contract the mapping layer calls to read, insert,
//! update and evict a cached record inside a transaction boundary. All four
//! policies implement it; [`AccessStrategy`] is the closed tagged dispatch
//! over them, chosen once per cacheable type when configuration is resolved.

use crate::nonstrict::NonstrictReadWriteStrategy;
use crate::read_only::ReadOnlyStrategy;
use crate::read_write::ReadWriteStrategy;
use crate::transactional::TransactionalStrategy;
use softcache_core::{
    AccessType, CacheKey, CachedRecord, Coordinator, Error, Region, Result, SoftLock,
    TransactionObserver, TxnId, Version,
};
use std::sync::Arc;

/// The operation set shared by every access policy
///
/// Every operation takes the ambient transaction's identifier and a
/// [`CacheKey`]. The failure model is uniform: staleness and lock contention
/// never raise — a contended or stale read is served as a miss and the
/// caller falls through to the system of record. Region backend errors
/// degrade to miss/no-op on reads and best-effort writes, and propagate only
/// from mandatory invalidation or lock-maintenance steps.
pub trait RegionAccess: Send + Sync {
    /// Non-blocking read of the cached record under `key`
    ///
    /// Returns `Ok(None)` if the entry is absent, locked by an in-flight
    /// write, or invalidated. Never blocks; never errors for absence.
    ///
    /// # Errors
    ///
    /// Never fails for cache-consistency reasons; backend failures are
    /// degraded to a miss.
    fn get(&self, txn: TxnId, key: &CacheKey) -> Result<Option<CachedRecord>>;

    /// Best-effort population after loading from the system of record
    ///
    /// A no-op (returns `Ok(false)`) if the region already holds a locked
    /// entry or one the supplied version does not refresh, guarding against
    /// a slow load overwriting a value a faster concurrent write already
    /// uncached.
    ///
    /// # Errors
    ///
    /// Backend failures are degraded to a skipped put.
    fn put_from_load(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool>;

    /// First phase of a two-phase write for a newly created record
    ///
    /// # Errors
    ///
    /// Propagates backend failures from lock placement, where the policy
    /// locks.
    fn insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool>;

    /// Second phase of an insert, after the underlying insert succeeded
    ///
    /// Only reached while the surrounding transaction is still progressing.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from mandatory lock release.
    fn after_insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool>;

    /// First phase of a two-phase write for a mutated record
    ///
    /// `previous_version` carries the pre-image version for optimistic
    /// conflict detection where the policy applies it.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from mandatory pre-invalidation or lock
    /// placement; returns [`Error::IllegalOperation`] under the read-only
    /// policy.
    fn update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        previous_version: Version,
    ) -> Result<bool>;

    /// Second phase of an update, after the underlying update succeeded
    ///
    /// # Errors
    ///
    /// Propagates backend failures from mandatory lock release; returns
    /// [`Error::IllegalOperation`] under the read-only policy.
    fn after_update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        previous_version: Version,
        lock: Option<SoftLock>,
    ) -> Result<bool>;

    /// Unconditional removal on delete
    ///
    /// # Errors
    ///
    /// Removal is a mandatory invalidation; backend failures propagate.
    fn remove(&self, txn: TxnId, key: &CacheKey) -> Result<()>;

    /// Unconditional removal outside any transaction (explicit invalidation)
    ///
    /// # Errors
    ///
    /// Backend failures propagate, as with [`RegionAccess::remove`].
    fn evict(&self, key: &CacheKey) -> Result<()>;

    /// Region-level lock primitive; meaning depends on the policy
    ///
    /// Returns `Ok(None)` where the policy has nothing to protect.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from lock placement.
    fn lock_item(&self, txn: TxnId, key: &CacheKey, version: Version) -> Result<Option<SoftLock>>;

    /// Release a previously acquired lock token
    ///
    /// Safe to call after the lock was already released automatically (for
    /// example on rollback): the stale token is accepted silently.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from mandatory lock release.
    fn unlock_item(&self, txn: TxnId, key: &CacheKey, lock: SoftLock) -> Result<()>;
}

/// Closed dispatch over the four access policies
///
/// The variants are exhaustive and mutually exclusive by design; there is no
/// open-ended subclassing. Construction happens once per cacheable type via
/// [`AccessStrategy::for_access_type`].
pub enum AccessStrategy {
    /// Insert-once, never mutated
    ReadOnly(ReadOnlyStrategy),
    /// Soft-locking with rollback restoration
    ReadWrite(ReadWriteStrategy),
    /// Invalidation bracketing, no locks
    NonstrictReadWrite(NonstrictReadWriteStrategy),
    /// External two-phase coordinator adapter
    Transactional(TransactionalStrategy),
}

impl AccessStrategy {
    /// Build the strategy for a resolved access type over `region`
    ///
    /// # Errors
    ///
    /// Returns [`Error::CoordinatorUnavailable`] if the transactional policy
    /// is requested without a coordinator.
    pub fn for_access_type(
        access: AccessType,
        region: Arc<dyn Region>,
        coordinator: Option<Arc<dyn Coordinator>>,
    ) -> Result<Self> {
        let strategy = match access {
            AccessType::ReadOnly => AccessStrategy::ReadOnly(ReadOnlyStrategy::new(region)),
            AccessType::ReadWrite => AccessStrategy::ReadWrite(ReadWriteStrategy::new(region)),
            AccessType::NonstrictReadWrite => {
                AccessStrategy::NonstrictReadWrite(NonstrictReadWriteStrategy::new(region))
            }
            AccessType::Transactional => {
                let coordinator = coordinator.ok_or(Error::CoordinatorUnavailable)?;
                AccessStrategy::Transactional(TransactionalStrategy::new(region, coordinator))
            }
        };
        Ok(strategy)
    }

    /// The policy this strategy implements
    pub fn access_type(&self) -> AccessType {
        match self {
            AccessStrategy::ReadOnly(_) => AccessType::ReadOnly,
            AccessStrategy::ReadWrite(_) => AccessType::ReadWrite,
            AccessStrategy::NonstrictReadWrite(_) => AccessType::NonstrictReadWrite,
            AccessStrategy::Transactional(_) => AccessType::Transactional,
        }
    }

    fn inner(&self) -> &dyn RegionAccess {
        match self {
            AccessStrategy::ReadOnly(s) => s,
            AccessStrategy::ReadWrite(s) => s,
            AccessStrategy::NonstrictReadWrite(s) => s,
            AccessStrategy::Transactional(s) => s,
        }
    }

    fn observer(&self) -> &dyn TransactionObserver {
        match self {
            AccessStrategy::ReadOnly(s) => s,
            AccessStrategy::ReadWrite(s) => s,
            AccessStrategy::NonstrictReadWrite(s) => s,
            AccessStrategy::Transactional(s) => s,
        }
    }
}

impl RegionAccess for AccessStrategy {
    fn get(&self, txn: TxnId, key: &CacheKey) -> Result<Option<CachedRecord>> {
        self.inner().get(txn, key)
    }

    fn put_from_load(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        self.inner().put_from_load(txn, key, record, version)
    }

    fn insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        self.inner().insert(txn, key, record, version)
    }

    fn after_insert(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
    ) -> Result<bool> {
        self.inner().after_insert(txn, key, record, version)
    }

    fn update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        previous_version: Version,
    ) -> Result<bool> {
        self.inner().update(txn, key, record, version, previous_version)
    }

    fn after_update(
        &self,
        txn: TxnId,
        key: &CacheKey,
        record: CachedRecord,
        version: Version,
        previous_version: Version,
        lock: Option<SoftLock>,
    ) -> Result<bool> {
        self.inner()
            .after_update(txn, key, record, version, previous_version, lock)
    }

    fn remove(&self, txn: TxnId, key: &CacheKey) -> Result<()> {
        self.inner().remove(txn, key)
    }

    fn evict(&self, key: &CacheKey) -> Result<()> {
        self.inner().evict(key)
    }

    fn lock_item(&self, txn: TxnId, key: &CacheKey, version: Version) -> Result<Option<SoftLock>> {
        self.inner().lock_item(txn, key, version)
    }

    fn unlock_item(&self, txn: TxnId, key: &CacheKey, lock: SoftLock) -> Result<()> {
        self.inner().unlock_item(txn, key, lock)
    }
}

impl TransactionObserver for AccessStrategy {
    fn before_completion(&self, txn: TxnId) -> Result<()> {
        self.observer().before_completion(txn)
    }

    fn after_completion(&self, txn: TxnId, success: bool) -> Result<()> {
        self.observer().after_completion(txn, success)
    }
}
