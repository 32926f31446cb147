//! Saved location CRUD with geocoding.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::domain::{Address, Coordinates, Location, LocationId};
use crate::geocode::GeocodeError;
use crate::store::LocationStore;
use crate::upstream::{self, UpstreamPolicy};

use super::error::LocationError;

/// Resolves a postal address to coordinates.
///
/// This abstraction allows the registry to be tested without a network.
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the address has no match.
    fn geocode(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<Coordinates>, GeocodeError>> + Send;
}

/// A location as submitted by a client, before it has an id or coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
    pub address: Address,
}

/// Creates, reads, updates and deletes saved locations.
pub struct LocationRegistry<G, S> {
    geocoder: Arc<G>,
    store: Arc<S>,
    policy: UpstreamPolicy,
}

impl<G, S> LocationRegistry<G, S>
where
    G: Geocoder,
    S: LocationStore,
{
    pub fn new(geocoder: Arc<G>, store: Arc<S>, policy: UpstreamPolicy) -> Self {
        Self {
            geocoder,
            store,
            policy,
        }
    }

    /// Validate, geocode and save a new location.
    pub async fn create(&self, new: NewLocation) -> Result<Location, LocationError> {
        validate(&new.address)?;
        let coordinate = self.resolve(&new.address).await?;

        let location = Location {
            id: self.store.next_location_id().await?,
            name: new.name,
            address: new.address,
            coordinate,
        };
        self.store.insert_location(location.clone()).await?;

        info!(location_id = %location.id, coordinate = %location.coordinate, "location created");
        Ok(location)
    }

    pub async fn get(&self, id: LocationId) -> Result<Location, LocationError> {
        self.store
            .get_location(id)
            .await?
            .ok_or(LocationError::NotFound(id))
    }

    /// Replace the address of a location and geocode it again. The name is
    /// kept.
    pub async fn update(&self, id: LocationId, address: Address) -> Result<Location, LocationError> {
        validate(&address)?;
        let existing = self.get(id).await?;
        let coordinate = self.resolve(&address).await?;

        let location = Location {
            address,
            coordinate,
            ..existing
        };
        if !self.store.update_location(location.clone()).await? {
            return Err(LocationError::NotFound(id));
        }

        info!(location_id = %id, coordinate = %location.coordinate, "location updated");
        Ok(location)
    }

    pub async fn delete(&self, id: LocationId) -> Result<(), LocationError> {
        if !self.store.delete_location(id).await? {
            return Err(LocationError::NotFound(id));
        }
        info!(location_id = %id, "location deleted");
        Ok(())
    }

    async fn resolve(&self, address: &Address) -> Result<Coordinates, LocationError> {
        upstream::call(&self.policy, "geocode", || self.geocoder.geocode(address))
            .await
            .map_err(|failure| LocationError::UpstreamUnavailable(failure.to_string()))?
            .ok_or_else(|| LocationError::Unresolvable(address.one_line()))
    }
}

fn validate(address: &Address) -> Result<(), LocationError> {
    match address.missing_field() {
        Some(field) => Err(LocationError::Validation(format!("{field} is required"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    /// Geocoder answering from a fixed table keyed by street line.
    #[derive(Default)]
    struct TableGeocoder {
        table: HashMap<String, Coordinates>,
        failures: Mutex<VecDeque<u16>>,
        calls: AtomicUsize,
    }

    impl TableGeocoder {
        fn with(entries: &[(&str, f64, f64)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(street, lat, lng)| {
                        (street.to_string(), Coordinates::new(*lat, *lng).unwrap())
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn fail_next(&self, status: u16) {
            self.failures.lock().unwrap().push_back(status);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Geocoder for TableGeocoder {
        async fn geocode(&self, address: &Address) -> Result<Option<Coordinates>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.failures.lock().unwrap().pop_front() {
                return Err(GeocodeError::Status {
                    status,
                    message: String::new(),
                });
            }
            Ok(self.table.get(&address.address).copied())
        }
    }

    fn address(street: &str) -> Address {
        Address {
            address: street.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip: "94103".to_string(),
        }
    }

    fn new_location(name: &str, street: &str) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            address: address(street),
        }
    }

    fn registry(geocoder: Arc<TableGeocoder>) -> LocationRegistry<TableGeocoder, MemoryStore> {
        let policy = UpstreamPolicy::new(Duration::from_secs(1), 3, Duration::from_millis(10));
        LocationRegistry::new(geocoder, Arc::new(MemoryStore::new()), policy)
    }

    fn geocoder() -> Arc<TableGeocoder> {
        Arc::new(TableGeocoder::with(&[
            ("1 Market St", 37.7941, -122.3951),
            ("500 Castro St", 37.7609, -122.4350),
        ]))
    }

    #[tokio::test]
    async fn create_assigns_id_and_coordinates() {
        let registry = registry(geocoder());

        let ferry = registry.create(new_location("Ferry", "1 Market St")).await.unwrap();
        let castro = registry.create(new_location("Castro", "500 Castro St")).await.unwrap();

        assert_ne!(ferry.id, castro.id);
        assert_eq!(ferry.name, "Ferry");
        assert_eq!(ferry.coordinate.lat(), 37.7941);
        assert_eq!(registry.get(ferry.id).await.unwrap(), ferry);
    }

    #[tokio::test]
    async fn missing_field_rejected_before_geocoding() {
        let geocoder = geocoder();
        let registry = registry(geocoder.clone());
        let mut new = new_location("Nowhere", "1 Market St");
        new.address.city = "  ".to_string();

        let err = registry.create(new).await.unwrap_err();

        assert_eq!(err, LocationError::Validation("city is required".into()));
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_address_is_unresolvable() {
        let registry = registry(geocoder());

        let err = registry
            .create(new_location("Atlantis", "0 Ocean Floor"))
            .await
            .unwrap_err();

        assert!(matches!(err, LocationError::Unresolvable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_geocoder_failure_retried() {
        let geocoder = geocoder();
        geocoder.fail_next(503);
        let registry = registry(geocoder.clone());

        registry.create(new_location("Ferry", "1 Market St")).await.unwrap();

        assert_eq!(geocoder.calls(), 2);
    }

    #[tokio::test]
    async fn rejected_geocoder_lookup_is_unavailable() {
        let geocoder = geocoder();
        geocoder.fail_next(403);
        let registry = registry(geocoder.clone());

        let err = registry
            .create(new_location("Ferry", "1 Market St"))
            .await
            .unwrap_err();

        assert!(matches!(err, LocationError::UpstreamUnavailable(_)));
        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn update_geocodes_new_address() {
        let registry = registry(geocoder());
        let created = registry.create(new_location("Home", "1 Market St")).await.unwrap();

        let updated = registry
            .update(created.id, address("500 Castro St"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Home");
        assert_eq!(updated.address.address, "500 Castro St");
        assert_eq!(updated.coordinate.lat(), 37.7609);
        assert_eq!(registry.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_unknown_not_found() {
        let registry = registry(geocoder());
        let id = LocationId::new(9).unwrap();

        let err = registry.update(id, address("1 Market St")).await.unwrap_err();
        assert_eq!(err, LocationError::NotFound(id));
    }

    #[tokio::test]
    async fn delete_removes_location() {
        let registry = registry(geocoder());
        let created = registry.create(new_location("Ferry", "1 Market St")).await.unwrap();

        registry.delete(created.id).await.unwrap();

        assert_eq!(
            registry.get(created.id).await.unwrap_err(),
            LocationError::NotFound(created.id)
        );
        assert_eq!(
            registry.delete(created.id).await.unwrap_err(),
            LocationError::NotFound(created.id)
        );
    }
}
