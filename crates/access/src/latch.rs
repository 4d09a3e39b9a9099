//! Striped per-key latches
//!
//! The region contract offers no atomicity across calls, so every
//! read-modify-write sequence a strategy performs against one key must be
//! serialized locally. A fixed array of mutexes striped by key hash gives
//! single-writer-at-a-time per key while keeping operations on distinct keys
//! (almost always) contention-free.

use parking_lot::{Mutex, MutexGuard};
use softcache_core::CacheKey;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const STRIPES: usize = 64;

pub(crate) struct KeyLatches {
    stripes: Vec<Mutex<()>>,
}

impl KeyLatches {
    pub(crate) fn new() -> Self {
        KeyLatches {
            stripes: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Acquire the latch guarding `key`'s stripe
    pub(crate) fn guard(&self, key: &CacheKey) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let stripe = (hasher.finish() as usize) % STRIPES;
        self.stripes[stripe].lock()
    }
}

impl Default for KeyLatches {
    fn default() -> Self {
        KeyLatches::new()
    }
}
