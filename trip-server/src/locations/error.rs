//! Location registry errors.

use crate::domain::LocationId;
use crate::store::StoreError;

/// Errors from creating, reading or changing saved locations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    /// A required field is missing or malformed
    #[error("invalid location: {0}")]
    Validation(String),

    /// The geocoder has no match for the address
    #[error("address could not be geocoded: {0}")]
    Unresolvable(String),

    /// No location with this id
    #[error("location {0} not found")]
    NotFound(LocationId),

    /// The geocoder could not be reached or refused the lookup
    #[error("geocoder unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
