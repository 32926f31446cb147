//! Saved locations: the stops a trip is planned over.

mod error;
mod registry;

pub use error::LocationError;
pub use registry::{Geocoder, LocationRegistry, NewLocation};
