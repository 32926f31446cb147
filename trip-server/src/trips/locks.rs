//! Per-trip async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::TripId;

/// Serializes work on a single trip while letting different trips proceed
/// in parallel. Entries are dropped once no guard or waiter holds them.
#[derive(Debug, Clone, Default)]
pub struct TripLocks {
    inner: Arc<DashMap<TripId, Arc<Mutex<()>>>>,
}

impl TripLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `trip`.
    pub async fn lock(&self, trip: TripId) -> TripGuard {
        let lock = self
            .inner
            .entry(trip)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        TripGuard {
            trip,
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    /// Number of trips with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one trip; released on drop.
pub struct TripGuard {
    trip: TripId,
    locks: Arc<DashMap<TripId, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TripGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map itself still references the mutex: nobody is waiting.
        self.locks
            .remove_if(&self.trip, |_, lock| Arc::strong_count(lock) == 1);
    }
}
