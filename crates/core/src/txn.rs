//! Transaction identity and boundary callbacks
//!
//! The cache layer holds no transactions of its own. Every strategy
//! operation receives the ambient transaction's identifier from the caller,
//! and the caller's transaction manager notifies strategies of completion
//! through [`TransactionObserver`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the ambient transaction owning an access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxnId(Uuid);

impl TxnId {
    /// Allocate a fresh transaction identifier
    pub fn new() -> Self {
        TxnId(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TxnId {
    fn default() -> Self {
        TxnId::new()
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// Transaction-boundary callbacks
///
/// Strategies implement this so they can release soft locks or re-invalidate
/// entries at the correct instant relative to the underlying store's commit.
///
/// The contract is exactly-once: the transaction manager delivers one
/// `after_completion` call per transaction that touched the strategy, on
/// every path including rollback. If the process terminates abnormally and
/// the callback is never delivered, any soft locks held by that transaction
/// stay in place until an external reaper intervenes; this crate implements
/// no lock expiry of its own.
pub trait TransactionObserver: Send + Sync {
    /// Called before the underlying store commits
    ///
    /// # Errors
    ///
    /// Propagates region backend failures from mandatory pre-commit work.
    fn before_completion(&self, txn: TxnId) -> Result<()>;

    /// Called after the underlying store has committed or rolled back
    ///
    /// `success` reflects the outcome of the surrounding transaction.
    ///
    /// # Errors
    ///
    /// Propagates region backend failures from mandatory lock release or
    /// invalidation work; skipping those would allow stale reads.
    fn after_completion(&self, txn: TxnId, success: bool) -> Result<()>;
}
