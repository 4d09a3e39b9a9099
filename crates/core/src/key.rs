//! Cache key types
//!
//! A `CacheKey` is the immutable composite identity addressing one cached
//! record within a region: the entity-type discriminator, the primary-key
//! value, and an optional tenant discriminator. Keys are value types with
//! structural equality and are constructed per access, never stored
//! long-term by this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Primary-key value of a cached record
///
/// The mapping layer owns the real identifier type; this enum covers the
/// representations that cross the cache boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkValue {
    /// Numeric surrogate key
    Int(i64),
    /// Natural string key
    Text(String),
    /// Opaque composite key, pre-serialized by the mapping layer
    Bytes(Vec<u8>),
    /// UUID surrogate key
    Uuid(Uuid),
}

impl From<i64> for PkValue {
    fn from(v: i64) -> Self {
        PkValue::Int(v)
    }
}

impl From<&str> for PkValue {
    fn from(v: &str) -> Self {
        PkValue::Text(v.to_string())
    }
}

impl From<String> for PkValue {
    fn from(v: String) -> Self {
        PkValue::Text(v)
    }
}

impl From<Uuid> for PkValue {
    fn from(v: Uuid) -> Self {
        PkValue::Uuid(v)
    }
}

impl fmt::Display for PkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PkValue::Int(v) => write!(f, "{}", v),
            PkValue::Text(v) => write!(f, "{}", v),
            PkValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            PkValue::Uuid(v) => write!(f, "{}", v),
        }
    }
}

/// Composite identity of one cached record within a region
///
/// Equality and hashing are structural over (entity, id, tenant). The key is
/// immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    entity: String,
    id: PkValue,
    tenant: Option<String>,
}

impl CacheKey {
    /// Create a key for a non-tenant-scoped record
    pub fn new(entity: impl Into<String>, id: impl Into<PkValue>) -> Self {
        CacheKey {
            entity: entity.into(),
            id: id.into(),
            tenant: None,
        }
    }

    /// Create a key scoped to a tenant
    pub fn for_tenant(
        entity: impl Into<String>,
        id: impl Into<PkValue>,
        tenant: impl Into<String>,
    ) -> Self {
        CacheKey {
            entity: entity.into(),
            id: id.into(),
            tenant: Some(tenant.into()),
        }
    }

    /// The entity-type discriminator
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The primary-key value
    pub fn id(&self) -> &PkValue {
        &self.id
    }

    /// The tenant discriminator, if any
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}#{}@{}", self.entity, self.id, tenant),
            None => write!(f, "{}#{}", self.entity, self.id),
        }
    }
}
