//! Multi-stop trip planning and progression.
//!
//! [`TripPlanner`] turns an origin and a set of saved locations into an
//! ordered [`TripPlan`](crate::domain::TripPlan). [`TripProgressor`] then
//! walks that plan one leg at a time, requesting a ride for each leg from
//! the ride platform.

mod config;
mod error;
mod locks;
mod planner;
mod progress;
mod provider;

#[cfg(test)]
mod planner_tests;
#[cfg(test)]
mod testing;

pub use config::TripConfig;
pub use error::TripError;
pub use locks::{TripGuard, TripLocks};
pub use planner::TripPlanner;
pub use progress::TripProgressor;
pub use provider::{PricingService, ProductCatalog, RideDispatcher, first_estimate, first_product};
