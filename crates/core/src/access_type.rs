//! Cache concurrency access policies
//!
//! The four policies for managing concurrent access to a shared cache
//! region. The set is closed by design: each cacheable type selects exactly
//! one policy at configuration-resolution time, before any transaction runs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for managing concurrent access to a cache region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// Records may be added and removed, but never mutated. No lock
    /// machinery at all; attempting an update is a programming error.
    ReadOnly,
    /// Records may be added, removed and mutated. A soft lock on the cached
    /// item manages concurrent access during mutation.
    ReadWrite,
    /// Records may be added, removed and mutated. The cached item is
    /// invalidated before and after transaction completion instead of being
    /// locked. More vulnerable to inconsistency than `ReadWrite`, but allows
    /// higher throughput.
    NonstrictReadWrite,
    /// Records may be added, removed and mutated. Hard locking is delegated
    /// to an external two-phase transaction coordinator.
    Transactional,
}

impl AccessType {
    /// All policies, in declaration order
    pub const ALL: [AccessType; 4] = [
        AccessType::ReadOnly,
        AccessType::ReadWrite,
        AccessType::NonstrictReadWrite,
        AccessType::Transactional,
    ];

    /// The stable external name used for configuration round-tripping
    pub fn external_name(&self) -> &'static str {
        match self {
            AccessType::ReadOnly => "read-only",
            AccessType::ReadWrite => "read-write",
            AccessType::NonstrictReadWrite => "nonstrict-read-write",
            AccessType::Transactional => "transactional",
        }
    }

    /// The symbolic variant name, matched case-insensitively as a fallback
    fn symbolic_name(&self) -> &'static str {
        match self {
            AccessType::ReadOnly => "READ_ONLY",
            AccessType::ReadWrite => "READ_WRITE",
            AccessType::NonstrictReadWrite => "NONSTRICT_READ_WRITE",
            AccessType::Transactional => "TRANSACTIONAL",
        }
    }

    /// Resolve a policy from its external name
    ///
    /// Exact match against the canonical external name is tried first, then
    /// a case-normalized match against the symbolic variant name. Any other
    /// string is a fatal configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAccessType`] if the name matches neither form.
    pub fn from_external_name(name: &str) -> Result<AccessType> {
        for access in AccessType::ALL {
            if access.external_name() == name {
                return Ok(access);
            }
        }
        let upper = name.to_uppercase();
        for access in AccessType::ALL {
            if access.symbolic_name() == upper {
                return Ok(access);
            }
        }
        Err(Error::UnknownAccessType {
            name: name.to_string(),
        })
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.external_name())
    }
}
