//! Per-license-key write serialization.
//!
//! Every read-decide-write sequence on a license runs while holding the
//! guard for its key. Different keys never contend. Entries are dropped once
//! no caller holds or waits on them.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `license_key`.
    pub async fn acquire(&self, license_key: &str) -> KeyGuard<'_> {
        let lock = Arc::clone(&self.locks.entry(license_key.to_string()).or_default());
        let guard = lock.lock_owned().await;
        KeyGuard {
            locks: self,
            key: license_key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one license key; released on drop.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
