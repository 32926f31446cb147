//! Address geocoding.
//!
//! Resolves street addresses to coordinates through a Google-style
//! geocoding endpoint.

mod client;
mod error;
mod types;

pub use client::{GeocodeClient, GeocodeConfig};
pub use error::GeocodeError;
pub use types::{GeocodeResponse, GeocodeResult};
