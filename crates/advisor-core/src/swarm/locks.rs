//! Per-lead run locks
//!
//! Runs against the same lead write to the same record. Holding a lead's
//! lock for a whole run serializes them; runs on different leads proceed
//! concurrently.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of lead ID to async lock
#[derive(Default)]
pub struct LeadLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of a run
pub struct LeadGuard {
    _guard: OwnedMutexGuard<()>,
}

impl LeadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a lead
    pub async fn acquire(&self, lead_id: &str) -> LeadGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(lead_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        LeadGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Whether a lead is currently locked
    pub fn is_locked(&self, lead_id: &str) -> bool {
        self.locks
            .lock()
            .get(lead_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Drop entries nobody holds or waits on
    pub fn prune(&self) {
        self.locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
