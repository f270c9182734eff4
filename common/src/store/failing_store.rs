use std::sync::atomic::{AtomicUsize, Ordering};

use super::{MemoryStore, SharedStore, StoreError};

/// Wraps a `MemoryStore` and fails the next `n` reads with an IO error.
/// Writes always go through.
pub struct FailingReads {
    inner: MemoryStore,
    remaining: AtomicUsize,
}

impl FailingReads {
    pub fn new(inner: MemoryStore, failures: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(failures),
        }
    }
}

impl SharedStore for FailingReads {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let failing = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Io(std::io::Error::other("store unavailable")));
        }
        self.inner.get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear()
    }
}
