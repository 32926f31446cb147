//! Ride platform client.
//!
//! This module provides an HTTP client for the ride-hailing platform, which
//! supplies price estimates, the product catalog and ride dispatch.
//!
//! Key characteristics of the platform:
//! - Read endpoints (`/estimates/price`, `/products`) authenticate with a
//!   server token and are safe to retry
//! - `/requests` creates a real dispatch and authenticates with an OAuth
//!   access token; it is never retried
//! - Estimates and products come back as lists; which element is used is
//!   decided by the trip engine, not here

mod client;
mod error;
mod mock;
mod types;

pub use client::{RideClient, RideConfig};
pub use error::RideError;
pub use mock::{MockFailure, MockRidePlatform};
pub use types::{PriceEstimate, PriceEstimates, Product, Products, RideReceipt, RideRequest};
