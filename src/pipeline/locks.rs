// Per-status-id mutual exclusion.
//
// The reshare check-then-act must not interleave for the same post. Each id
// gets its own async mutex on demand; the entry is dropped once the last
// holder or waiter releases it, so the map only holds ids in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::mastodon::types::StatusId;

#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<StatusId, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one post's check-then-act.
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: StatusId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no one else holds `key`, then hold it.
    pub async fn lock(&self, key: StatusId) -> KeyGuard<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key).or_default())
        };
        let guard = slot.lock_owned().await;
        KeyGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of ids currently locked or awaited.
    pub fn in_flight(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Release first so the strong count reflects only the map and waiters
        self.guard.take();
        let mut locks = self
            .owner
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            locks.remove(&self.key);
        }
    }
}
