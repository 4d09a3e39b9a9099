//! DashMap-backed in-memory region
//!
//! # Design
//!
//! - DashMap: sharded by default, lock-free reads, per-shard writes
//! - Per-key entries only; the region imposes no cross-key atomicity,
//!   matching the contract the access strategies are written against
//! - Atomic hit/miss/put/remove counters for observability

use dashmap::DashMap;
use softcache_core::{CacheKey, Entry, Region, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a region's access counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionStats {
    /// Reads that found an entry
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Entries stored
    pub puts: u64,
    /// Entries removed (including clears)
    pub removes: u64,
}

/// In-memory region backed by a sharded concurrent map
///
/// Never fails: the backend is the process's own memory. Useful both as the
/// default embedded region and as the in-memory fake for strategy tests.
pub struct MemoryRegion {
    name: String,
    entries: DashMap<CacheKey, Entry>,
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    removes: AtomicU64,
}

impl MemoryRegion {
    /// Create an empty region with the given name
    pub fn new(name: impl Into<String>) -> Self {
        MemoryRegion {
            name: name.into(),
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            removes: AtomicU64::new(0),
        }
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the region holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the access counters
    pub fn stats(&self) -> RegionStats {
        RegionStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
        }
    }
}

impl Region for MemoryRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Entry>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    fn put(&self, key: CacheKey, entry: Entry) -> Result<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key, entry);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.removes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let dropped = self.entries.len() as u64;
        self.entries.clear();
        self.removes.fetch_add(dropped, Ordering::Relaxed);
        tracing::debug!(region = %self.name, dropped, "cleared region");
        Ok(())
    }
}
