//! Cached record snapshots and versions
//!
//! A `CachedRecord` is the opaque serialized snapshot of a record's
//! persistent state. The mapping layer supplies and consumes the bytes; the
//! cache layer never looks inside them.
//!
//! A `Version` is the monotonically comparable value attached to a record
//! when optimistic versioning is in play. `Version::ZERO` means the record
//! is unversioned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque serialized snapshot of a record's persistent state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRecord(Vec<u8>);

impl CachedRecord {
    /// Wrap a serialized record
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        CachedRecord(bytes.into())
    }

    /// The serialized bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the serialized form
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CachedRecord {
    fn from(bytes: Vec<u8>) -> Self {
        CachedRecord(bytes)
    }
}

impl From<&[u8]> for CachedRecord {
    fn from(bytes: &[u8]) -> Self {
        CachedRecord(bytes.to_vec())
    }
}

/// Monotonically comparable record version
///
/// Used to detect and discard stale cache writes: a write whose version does
/// not exceed the currently stored one is dropped rather than applied, so an
/// older transaction that completes late cannot clobber a newer cached value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// The unversioned marker
    pub const ZERO: Version = Version(0);

    /// Create a version from its numeric value
    pub fn new(v: u64) -> Self {
        Version(v)
    }

    /// Numeric value of this version
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// True if this is a real version rather than the unversioned marker
    pub fn is_versioned(&self) -> bool {
        self.0 != 0
    }

    /// Whether a completed write carrying `self` wins over a stored entry at
    /// `current`
    ///
    /// Tie-break policy for the completion-time write path:
    /// - both versioned: the write must strictly exceed the stored version
    /// - versioned write over unversioned entry: the write wins
    /// - unversioned write over versioned entry: the write is stale
    /// - both unversioned: last completer wins
    pub fn supersedes(&self, current: Version) -> bool {
        match (self.is_versioned(), current.is_versioned()) {
            (true, true) => *self > current,
            (true, false) => true,
            (false, true) => false,
            (false, false) => true,
        }
    }

    /// Whether a load from the system of record carrying `self` may replace
    /// a stored entry at `current`
    ///
    /// Stricter than [`Version::supersedes`]: an unversioned load never
    /// replaces an existing entry, so a slow loader cannot overwrite a value
    /// some concurrent transaction already refreshed.
    pub fn refreshes(&self, current: Version) -> bool {
        match (self.is_versioned(), current.is_versioned()) {
            (true, true) => *self > current,
            (true, false) => true,
            _ => false,
        }
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Version(v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_versioned() {
            write!(f, "v{}", self.0)
        } else {
            write!(f, "unversioned")
        }
    }
}
