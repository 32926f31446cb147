//! Collaborators the trip engine depends on.
//!
//! These abstractions allow the engine to be tested with a mock platform.

use std::future::Future;

use crate::domain::Coordinates;
use crate::ride::{PriceEstimate, Product, RideError, RideReceipt, RideRequest};

/// Price/time estimates between two points.
pub trait PricingService: Send + Sync {
    fn price_estimates(
        &self,
        start: Coordinates,
        end: Coordinates,
    ) -> impl Future<Output = Result<Vec<PriceEstimate>, RideError>> + Send;
}

/// Ride products available at a point.
pub trait ProductCatalog: Send + Sync {
    fn products(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = Result<Vec<Product>, RideError>> + Send;
}

/// Ride dispatch. Each call creates a real request on the platform.
pub trait RideDispatcher: Send + Sync {
    fn request_ride(
        &self,
        request: &RideRequest,
    ) -> impl Future<Output = Result<RideReceipt, RideError>> + Send;
}

/// Estimate selection policy: the first estimate the pricing service lists
/// wins. Products are not compared on price.
pub fn first_estimate(estimates: Vec<PriceEstimate>) -> Option<PriceEstimate> {
    estimates.into_iter().next()
}

/// Product selection policy: the first product the catalog lists wins.
/// Products are not ranked by price or capacity.
pub fn first_product(products: Vec<Product>) -> Option<Product> {
    products.into_iter().next()
}
