//! Shared fixtures for the trip engine tests.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Address, Coordinates, Location, LocationId};
use crate::ride::MockRidePlatform;
use crate::store::{LocationStore, MemoryStore};
use crate::upstream::UpstreamPolicy;

use super::{TripConfig, TripPlanner, TripProgressor};

pub type MockPlanner = TripPlanner<MockRidePlatform, MemoryStore>;
pub type MockProgressor = TripProgressor<MockRidePlatform, MockRidePlatform, MemoryStore>;

pub fn coords(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
}

/// Short timeouts and backoff so paused-clock tests stay quick to read.
pub fn fast_config() -> TripConfig {
    let policy = UpstreamPolicy::new(Duration::from_secs(1), 3, Duration::from_millis(10));
    TripConfig::new(policy, policy, policy)
}

pub async fn save(store: &MemoryStore, name: &str, at: Coordinates) -> LocationId {
    let id = store.next_location_id().await.unwrap();
    store
        .insert_location(Location {
            id,
            name: name.to_string(),
            address: Address {
                address: format!("1 {name} St"),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip: "94105".to_string(),
            },
            coordinate: at,
        })
        .await
        .unwrap();
    id
}

/// A store and mock platform with an origin at (0, 0).
pub struct Fixture {
    pub platform: MockRidePlatform,
    pub store: MemoryStore,
    pub origin: LocationId,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let origin = save(&store, "Origin", coords(0.0, 0.0)).await;
        Self {
            platform: MockRidePlatform::new(),
            store,
            origin,
        }
    }

    /// Save a stop at `at` that the platform prices at `distance` miles.
    pub async fn stop(&self, name: &str, at: Coordinates, distance: f64) -> LocationId {
        let id = save(&self.store, name, at).await;
        self.platform
            .set_estimate(at, distance, (distance * 120.0) as u64, (distance * 2.0) as u64 + 5);
        id
    }

    pub fn planner(&self) -> MockPlanner {
        TripPlanner::new(
            Arc::new(self.platform.clone()),
            Arc::new(self.store.clone()),
            fast_config(),
        )
    }

    pub fn progressor(&self) -> MockProgressor {
        TripProgressor::new(
            Arc::new(self.platform.clone()),
            Arc::new(self.platform.clone()),
            Arc::new(self.store.clone()),
            fast_config(),
        )
    }
}
