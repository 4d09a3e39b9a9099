//! Shared helpers and test doubles

use softcache::{CacheKey, CachedRecord, Entry, Error, MemoryRegion, Region, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn key(id: i64) -> CacheKey {
    CacheKey::new("Order", id)
}

pub fn record(byte: u8) -> CachedRecord {
    CachedRecord::new(vec![byte])
}

/// Region double whose backend can be taken down per operation kind
pub struct FaultRegion {
    delegate: MemoryRegion,
    pub fail_gets: AtomicBool,
    pub fail_puts: AtomicBool,
    pub fail_removes: AtomicBool,
}

impl FaultRegion {
    pub fn new() -> Arc<Self> {
        Arc::new(FaultRegion {
            delegate: MemoryRegion::new("fault"),
            fail_gets: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
        })
    }

    fn down(&self, flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(Error::region("fault", "backend unavailable"))
        } else {
            Ok(())
        }
    }
}

impl Region for FaultRegion {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Entry>> {
        self.down(&self.fail_gets)?;
        self.delegate.get(key)
    }

    fn put(&self, key: CacheKey, entry: Entry) -> Result<()> {
        self.down(&self.fail_puts)?;
        self.delegate.put(key, entry)
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        self.down(&self.fail_removes)?;
        self.delegate.remove(key)
    }

    fn clear(&self) -> Result<()> {
        self.delegate.clear()
    }
}
