//! In-process store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::domain::{Location, LocationId, ProgressId, TripId, TripPlan, TripProgress};

use super::{LocationStore, StoreError, TripStore};

/// Atomic id sequence starting at 1.
#[derive(Debug)]
struct Sequence(AtomicU64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Inner {
    locations: RwLock<HashMap<LocationId, Location>>,
    trips: RwLock<HashMap<TripId, TripPlan>>,
    progress: RwLock<HashMap<TripId, Vec<TripProgress>>>,
    location_ids: Sequence,
    trip_ids: Sequence,
    progress_ids: Sequence,
    read_only: AtomicBool,
}

/// Thread-safe in-memory store.
///
/// Cheap to clone; clones share the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                locations: RwLock::new(HashMap::new()),
                trips: RwLock::new(HashMap::new()),
                progress: RwLock::new(HashMap::new()),
                location_ids: Sequence::new(),
                trip_ids: Sequence::new(),
                progress_ids: Sequence::new(),
                read_only: AtomicBool::new(false),
            }),
        }
    }

    /// Reject (or accept again) every write, e.g. during maintenance.
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of stored trips.
    pub async fn trip_count(&self) -> usize {
        self.inner.trips.read().await.len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.inner.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is read-only".to_string()));
        }
        Ok(())
    }
}

impl LocationStore for MemoryStore {
    async fn next_location_id(&self) -> Result<LocationId, StoreError> {
        let raw = self.inner.location_ids.next();
        LocationId::new(raw)
            .ok_or_else(|| StoreError::Unavailable("location id sequence exhausted".to_string()))
    }

    async fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut locations = self.inner.locations.write().await;
        if locations.contains_key(&location.id) {
            return Err(StoreError::Duplicate {
                kind: "location",
                id: location.id.to_string(),
            });
        }
        locations.insert(location.id, location);
        Ok(())
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        Ok(self.inner.locations.read().await.get(&id).cloned())
    }

    async fn update_location(&self, location: Location) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut locations = self.inner.locations.write().await;
        match locations.get_mut(&location.id) {
            Some(existing) => {
                *existing = location;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_location(&self, id: LocationId) -> Result<bool, StoreError> {
        self.check_writable()?;
        Ok(self.inner.locations.write().await.remove(&id).is_some())
    }
}

impl TripStore for MemoryStore {
    async fn next_trip_id(&self) -> Result<TripId, StoreError> {
        Ok(TripId::new(self.inner.trip_ids.next()))
    }

    async fn insert_trip(&self, plan: TripPlan) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut trips = self.inner.trips.write().await;
        if trips.contains_key(&plan.id) {
            return Err(StoreError::Duplicate {
                kind: "trip",
                id: plan.id.to_string(),
            });
        }
        trips.insert(plan.id, plan);
        Ok(())
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<TripPlan>, StoreError> {
        Ok(self.inner.trips.read().await.get(&id).cloned())
    }

    async fn advance_cursor(&self, id: TripId, expected: usize) -> Result<TripPlan, StoreError> {
        self.check_writable()?;
        let mut trips = self.inner.trips.write().await;
        let plan = trips.get_mut(&id).ok_or_else(|| StoreError::Missing {
            kind: "trip",
            id: id.to_string(),
        })?;

        if plan.cursor != expected || plan.is_completed() {
            return Err(StoreError::CursorConflict {
                trip: id,
                expected,
                found: plan.cursor,
            });
        }

        plan.advance_cursor();
        Ok(plan.clone())
    }

    async fn next_progress_id(&self) -> Result<ProgressId, StoreError> {
        Ok(ProgressId::new(self.inner.progress_ids.next()))
    }

    async fn insert_progress(&self, progress: TripProgress) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner
            .progress
            .write()
            .await
            .entry(progress.trip_id)
            .or_default()
            .push(progress);
        Ok(())
    }

    async fn progress_for(&self, id: TripId) -> Result<Vec<TripProgress>, StoreError> {
        Ok(self
            .inner
            .progress
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}
