//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, LocationId, TripPlan, TripProgress, TripStatus};
use crate::locations::NewLocation;

/// Request to save a location.
#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Street line
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub zip: String,
}

impl From<CreateLocationRequest> for NewLocation {
    fn from(req: CreateLocationRequest) -> Self {
        NewLocation {
            name: req.name,
            address: Address {
                address: req.address,
                city: req.city,
                state: req.state,
                zip: req.zip,
            },
        }
    }
}

/// Request to change the address of a location.
#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub zip: String,
}

impl From<UpdateLocationRequest> for Address {
    fn from(req: UpdateLocationRequest) -> Self {
        Address {
            address: req.address,
            city: req.city,
            state: req.state,
            zip: req.zip,
        }
    }
}

/// Request to plan a trip.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    /// Stops to visit, as location ids
    pub location_ids: Vec<String>,

    /// Where the trip starts
    pub starting_from_location_id: String,
}

/// A planned trip.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TripResponse {
    pub id: String,

    pub status: TripStatus,

    pub starting_from_location_id: LocationId,

    /// Stops in visiting order
    pub best_route_location_ids: Vec<LocationId>,

    /// Sum of the low cost estimates of every leg
    pub total_uber_costs: u64,

    /// Seconds
    pub total_uber_duration: u64,

    /// Miles
    pub total_distance: f64,
}

impl From<TripPlan> for TripResponse {
    fn from(plan: TripPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            status: plan.status,
            starting_from_location_id: plan.origin,
            best_route_location_ids: plan.stops,
            total_uber_costs: plan.totals.cost,
            total_uber_duration: plan.totals.duration,
            total_distance: plan.totals.distance,
        }
    }
}

/// Snapshot after one leg of a trip was requested.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressResponse {
    pub id: String,

    pub trip_id: String,

    pub status: TripStatus,

    /// Pickup point of the requested leg
    pub starting_from_location_id: LocationId,

    /// Drop-off point of the requested leg
    pub next_destination_location_id: LocationId,

    pub best_route_location_ids: Vec<LocationId>,

    pub total_uber_costs: u64,

    pub total_uber_duration: u64,

    pub total_distance: f64,

    /// Pickup ETA as reported by the ride platform
    pub uber_wait_time_eta: u32,

    /// Legs requested so far, including this one
    pub cursor: usize,

    /// Ride platform request id
    pub request_id: String,
}

impl From<TripProgress> for ProgressResponse {
    fn from(progress: TripProgress) -> Self {
        Self {
            id: progress.id.to_string(),
            trip_id: progress.trip_id.to_string(),
            status: progress.status,
            starting_from_location_id: progress.origin,
            next_destination_location_id: progress.destination,
            best_route_location_ids: progress.stops,
            total_uber_costs: progress.totals.cost,
            total_uber_duration: progress.totals.duration,
            total_distance: progress.totals.distance,
            uber_wait_time_eta: progress.wait_eta,
            cursor: progress.cursor,
            request_id: progress.request_id,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error class (`not_found`, `validation_error`, ...)
    pub kind: String,

    pub error: String,
}
