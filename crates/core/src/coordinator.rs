//! External two-phase coordinator hooks
//!
//! The transactional access policy does not implement hard locking itself.
//! It registers the cache's participation with an external two-phase-commit
//! coordinator, which later drives the participant's prepare/commit/rollback
//! in lock-step with the surrounding distributed transaction. Beyond "it
//! will call our hooks at the right time", the coordinator is opaque to this
//! crate.

use crate::error::Result;
use crate::key::CacheKey;
use crate::txn::TxnId;
use std::sync::Arc;

/// A resource enlisted with the external coordinator
///
/// Implemented by the transactional strategy so its pending region writes
/// become durable, or are rolled back, with the two-phase outcome.
pub trait Participant: Send + Sync {
    /// Phase one: vote on whether the cache-side work can be made durable
    ///
    /// # Errors
    ///
    /// An error is a "no" vote; the coordinator will roll the transaction
    /// back.
    fn prepare(&self, txn: TxnId) -> Result<()>;

    /// Phase two, success: apply the transaction's pending region writes
    ///
    /// # Errors
    ///
    /// Returns an error if applying a write to the region backend fails.
    fn commit(&self, txn: TxnId) -> Result<()>;

    /// Phase two, failure: discard the transaction's pending region writes
    ///
    /// # Errors
    ///
    /// Returns an error if backend-side cleanup fails.
    fn rollback(&self, txn: TxnId) -> Result<()>;
}

/// External two-phase-commit-capable transaction coordinator
pub trait Coordinator: Send + Sync {
    /// Register the cache's participation for the given keys
    ///
    /// Called the first time a transaction touches each key. The coordinator
    /// must deliver exactly one prepare/commit or prepare/rollback sequence
    /// to `participant` for each enlisted transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if enlistment is refused; the strategy treats this
    /// as fatal to the cache-side operation that triggered it.
    fn enlist(
        &self,
        txn: TxnId,
        keys: &[CacheKey],
        participant: Arc<dyn Participant>,
    ) -> Result<()>;
}
