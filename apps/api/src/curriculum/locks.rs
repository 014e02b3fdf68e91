// Per-analysis generation locks.
// Requests for the same gap analysis run one at a time; an entry lives only while
// someone holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

type LockMap = HashMap<Uuid, Arc<AsyncMutex<()>>>;

#[derive(Clone, Default)]
pub struct GenerationLocks {
    inner: Arc<Mutex<LockMap>>,
}

/// Held for the duration of one generation; releasing it wakes the next waiter.
pub struct GenerationPermit {
    key: Uuid,
    locks: Arc<Mutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: Uuid) -> GenerationPermit {
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries left behind by cancelled waiters.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(key).or_default().clone()
        };
        if entry.try_lock().is_err() {
            debug!("Generation for analysis {} waiting on an earlier request", key);
        }
        let guard = entry.lock_owned().await;
        GenerationPermit {
            key,
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    /// Keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map and one in our guard means nobody is waiting.
        if map
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            map.remove(&self.key);
        }
        self.guard.take();
    }
}
