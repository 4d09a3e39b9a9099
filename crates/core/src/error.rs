//! Error types for softcache
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy is deliberately small:
//! - `UnknownAccessType` is a fatal configuration error, raised before any
//!   transaction runs.
//! - `IllegalOperation` is a fatal programming error (for example, updating a
//!   record cached as read-only).
//! - `Region` is a cache backend failure. Strategies recover from it locally
//!   on reads and best-effort writes (degrade to a miss), but propagate it
//!   when it occurs during a mandatory invalidation or lock-maintenance step.
//! - `CoordinatorUnavailable` is raised at strategy construction when the
//!   transactional policy is selected without a two-phase coordinator wired.
//!
//! Lock contention is never an error: a contended key is served as a cache
//! miss and the caller falls through to the system of record.

use thiserror::Error;

/// Result type alias for softcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cache concurrency layer
#[derive(Debug, Error)]
pub enum Error {
    /// Unresolvable access-type name in configuration
    #[error("unknown access type: {name:?}")]
    UnknownAccessType {
        /// The external name that failed to resolve
        name: String,
    },

    /// Operation not permitted by the selected access policy
    #[error("illegal cache operation: {0}")]
    IllegalOperation(String),

    /// Cache backend failure reported by a region
    #[error("region {region:?} backend error: {message}")]
    Region {
        /// Name of the region that failed
        region: String,
        /// Backend-supplied failure description
        message: String,
    },

    /// Transactional access selected but no coordinator configured
    #[error("transactional access requires a two-phase coordinator, none configured")]
    CoordinatorUnavailable,
}

impl Error {
    /// Build a region backend error
    pub fn region(region: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Region {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Build an illegal-operation error
    pub fn illegal(message: impl Into<String>) -> Self {
        Error::IllegalOperation(message.into())
    }

    /// True if this error came from the cache backend
    ///
    /// Backend errors are the only recoverable class: read paths translate
    /// them into cache misses instead of failing the surrounding transaction.
    pub fn is_region(&self) -> bool {
        matches!(self, Error::Region { .. })
    }
}
