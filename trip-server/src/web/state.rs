//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, CachedCatalog};
use crate::geocode::GeocodeClient;
use crate::locations::{Geocoder, LocationRegistry};
use crate::ride::RideClient;
use crate::store::MemoryStore;
use crate::trips::{
    PricingService, ProductCatalog, RideDispatcher, TripConfig, TripPlanner, TripProgressor,
};
use crate::upstream::UpstreamPolicy;

/// A ride platform that prices, lists products and dispatches.
pub trait RideBackend: PricingService + ProductCatalog + RideDispatcher + Clone + 'static {}

impl<T> RideBackend for T where T: PricingService + ProductCatalog + RideDispatcher + Clone + 'static {}

/// Shared application state.
///
/// Contains all the services needed to handle requests. Defaults to the real
/// HTTP clients; tests plug in the mock platform.
pub struct AppState<R = RideClient, G = GeocodeClient> {
    /// Trip planning
    pub planner: Arc<TripPlanner<R, MemoryStore>>,

    /// Leg-by-leg ride requests, with a cached product catalog
    pub progressor: Arc<TripProgressor<CachedCatalog<R>, R, MemoryStore>>,

    /// Saved locations
    pub locations: Arc<LocationRegistry<G, MemoryStore>>,
}

impl<R, G> Clone for AppState<R, G> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
            progressor: Arc::clone(&self.progressor),
            locations: Arc::clone(&self.locations),
        }
    }
}

impl<R: RideBackend, G: Geocoder + 'static> AppState<R, G> {
    /// Wire every service onto one shared store.
    pub fn new(
        ride: R,
        geocoder: G,
        store: MemoryStore,
        trips: TripConfig,
        cache: &CacheConfig,
        geocode_policy: UpstreamPolicy,
    ) -> Self {
        let store = Arc::new(store);
        let ride_shared = Arc::new(ride.clone());

        let planner = TripPlanner::new(ride_shared.clone(), store.clone(), trips.clone());
        let progressor = TripProgressor::new(
            Arc::new(CachedCatalog::new(ride, cache)),
            ride_shared,
            store.clone(),
            trips,
        );
        let locations = LocationRegistry::new(Arc::new(geocoder), store, geocode_policy);

        Self {
            planner: Arc::new(planner),
            progressor: Arc::new(progressor),
            locations: Arc::new(locations),
        }
    }
}
