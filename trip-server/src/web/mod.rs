//! Web layer for the trip service.
//!
//! Provides HTTP endpoints for saved locations, trip planning and
//! leg-by-leg ride requests.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, RideBackend};
