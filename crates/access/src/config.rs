//! Cache configuration surface
//!
//! The mapping layer supplies one access-type string per cacheable type.
//! Resolution happens once, before any transaction runs: every string must
//! name one of the four policies or configuration fails fast.

use serde::{Deserialize, Serialize};
use softcache_core::{AccessType, Result};
use std::collections::BTreeMap;
use tracing::error;

/// Cache settings for one cacheable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCacheConfig {
    /// External access-type name (for example `"read-write"`)
    pub access: String,
    /// Region name; defaults to the entity name when omitted
    #[serde(default)]
    pub region: Option<String>,
}

/// Cache settings resolved for one cacheable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntityCache {
    /// The resolved access policy
    pub access: AccessType,
    /// The region this type caches into
    pub region: String,
}

/// Per-entity cache configuration as deserialized from the mapping layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entity name to cache settings
    pub entities: BTreeMap<String, EntityCacheConfig>,
}

impl CacheConfig {
    /// Resolve every access-type string, failing fast on the first
    /// unrecognized value
    ///
    /// # Errors
    ///
    /// Returns [`softcache_core::Error::UnknownAccessType`] if any entity
    /// names an access type outside the accepted set.
    pub fn resolve(&self) -> Result<BTreeMap<String, ResolvedEntityCache>> {
        let mut resolved = BTreeMap::new();
        for (entity, config) in &self.entities {
            let access = AccessType::from_external_name(&config.access).map_err(|err| {
                error!(%entity, access = %config.access, "unresolvable cache access type");
                err
            })?;
            resolved.insert(
                entity.clone(),
                ResolvedEntityCache {
                    access,
                    region: config.region.clone().unwrap_or_else(|| entity.clone()),
                },
            );
        }
        Ok(resolved)
    }
}
