//! Trip engine errors.

use crate::domain::{LocationId, TripId};
use crate::store::StoreError;

/// Errors from planning or advancing a trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TripError {
    /// The request itself is malformed
    #[error("invalid trip request: {0}")]
    Validation(String),

    /// A referenced location does not exist
    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    /// The trip does not exist
    #[error("trip {0} not found")]
    TripNotFound(TripId),

    /// Pricing, catalog or dispatch could not be reached or timed out
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The catalog lists no product at the pickup point
    #[error("no ride product available at location {0}")]
    NoProductAvailable(LocationId),

    /// The platform refused or garbled the ride request
    #[error("ride request failed: {0}")]
    DispatchFailed(String),

    /// Every leg of the trip was already requested
    #[error("trip {0} is already completed")]
    AlreadyCompleted(TripId),

    /// Persistence failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
