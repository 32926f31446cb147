//! Domain types for the trip service.
//!
//! Identifiers and coordinates validate their input at construction time,
//! so code that receives them can trust their validity.

mod location;
mod trip;

pub use location::{Address, Coordinates, InvalidCoordinates, InvalidLocationId, Location, LocationId};
pub use trip::{
    Leg, LegEstimate, ProgressId, TripId, TripPlan, TripProgress, TripStatus, TripTotals,
};
