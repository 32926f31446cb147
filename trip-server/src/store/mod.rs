//! Persistence for saved locations, trip plans and progress snapshots.
//!
//! The trip engine only talks to the traits defined here. Identifier
//! assignment belongs to the store so that concurrent requests never see the
//! same id, and cursor updates are conditional on the cursor the caller read.

mod memory;

use std::future::Future;

use crate::domain::{Location, LocationId, ProgressId, TripId, TripPlan, TripProgress};

pub use memory::MemoryStore;

/// Errors from a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with this id already exists
    #[error("{kind} {id} already exists")]
    Duplicate { kind: &'static str, id: String },

    /// A record that must exist is missing
    #[error("{kind} {id} not found")]
    Missing { kind: &'static str, id: String },

    /// The stored cursor moved since it was read
    #[error("trip {trip}: cursor conflict (expected {expected}, found {found})")]
    CursorConflict {
        trip: TripId,
        expected: usize,
        found: usize,
    },

    /// The store cannot serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage for saved locations.
pub trait LocationStore: Send + Sync {
    /// Allocate a fresh location id. Never returns the same id twice.
    fn next_location_id(&self) -> impl Future<Output = Result<LocationId, StoreError>> + Send;

    fn insert_location(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get_location(
        &self,
        id: LocationId,
    ) -> impl Future<Output = Result<Option<Location>, StoreError>> + Send;

    /// Replace an existing location. Returns `false` when it does not exist.
    fn update_location(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove a location. Returns `false` when it does not exist.
    fn delete_location(&self, id: LocationId)
    -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Storage for trip plans and their progress history.
pub trait TripStore: Send + Sync {
    /// Allocate a fresh trip id. Never returns the same id twice.
    fn next_trip_id(&self) -> impl Future<Output = Result<TripId, StoreError>> + Send;

    fn insert_trip(&self, plan: TripPlan) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get_trip(
        &self,
        id: TripId,
    ) -> impl Future<Output = Result<Option<TripPlan>, StoreError>> + Send;

    /// Move the cursor of `id` from `expected` to `expected + 1`.
    ///
    /// Fails with [`StoreError::CursorConflict`] when the stored cursor is not
    /// `expected`. Returns the updated plan.
    fn advance_cursor(
        &self,
        id: TripId,
        expected: usize,
    ) -> impl Future<Output = Result<TripPlan, StoreError>> + Send;

    /// Allocate a fresh progress snapshot id.
    fn next_progress_id(&self) -> impl Future<Output = Result<ProgressId, StoreError>> + Send;

    fn insert_progress(
        &self,
        progress: TripProgress,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Progress snapshots of a trip, oldest first.
    fn progress_for(
        &self,
        id: TripId,
    ) -> impl Future<Output = Result<Vec<TripProgress>, StoreError>> + Send;
}
