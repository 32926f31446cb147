//! Leg-by-leg progression of a planned trip.
//!
//! Each advance requests a ride for the leg under the cursor. The stored
//! cursor only moves once the platform accepted the request, and only if no
//! one else moved it in the meantime.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{TripId, TripProgress, TripStatus};
use crate::ride::{RideError, RideRequest};
use crate::store::{LocationStore, TripStore};
use crate::upstream::{self, UpstreamFailure};

use super::config::TripConfig;
use super::error::TripError;
use super::locks::TripLocks;
use super::planner::resolve;
use super::provider::{ProductCatalog, RideDispatcher, first_product};

/// Requests rides for the legs of stored trips.
pub struct TripProgressor<C, D, S> {
    catalog: Arc<C>,
    dispatcher: Arc<D>,
    store: Arc<S>,
    locks: TripLocks,
    config: TripConfig,
}

impl<C, D, S> TripProgressor<C, D, S>
where
    C: ProductCatalog,
    D: RideDispatcher,
    S: LocationStore + TripStore,
{
    pub fn new(catalog: Arc<C>, dispatcher: Arc<D>, store: Arc<S>, config: TripConfig) -> Self {
        Self {
            catalog,
            dispatcher,
            store,
            locks: TripLocks::new(),
            config,
        }
    }

    /// Request a ride for the next leg of `trip_id`.
    ///
    /// A completed trip fails with [`TripError::AlreadyCompleted`] before
    /// any upstream call is made. On failure the cursor stays where it was.
    /// Once the cursor has moved the ride counts as requested, even if the
    /// progress snapshot cannot be saved.
    pub async fn advance(&self, trip_id: TripId) -> Result<TripProgress, TripError> {
        let _guard = self.locks.lock(trip_id).await;

        let plan = self
            .store
            .get_trip(trip_id)
            .await?
            .ok_or(TripError::TripNotFound(trip_id))?;
        let Some(leg) = plan.next_leg() else {
            return Err(TripError::AlreadyCompleted(trip_id));
        };

        let from = resolve(&*self.store, leg.from).await?;
        let to = resolve(&*self.store, leg.to).await?;

        let products = upstream::call(&self.config.catalog, "product lookup", || {
            self.catalog.products(from.coordinate)
        })
        .await
        .map_err(|failure| {
            TripError::UpstreamUnavailable(format!("products at location {}: {failure}", from.id))
        })?;
        let product = first_product(products).ok_or(TripError::NoProductAvailable(from.id))?;
        let progress_id = self.store.next_progress_id().await?;

        let request = RideRequest::new(product.product_id, from.coordinate, to.coordinate);
        let receipt = upstream::call(&self.config.dispatch, "ride request", || {
            self.dispatcher.request_ride(&request)
        })
        .await
        .map_err(|failure| {
            warn!(trip_id = %trip_id, leg = leg.index, %failure, "ride request failed");
            dispatch_error(failure)
        })?;

        let advanced = self.store.advance_cursor(trip_id, leg.index).await?;

        let progress = TripProgress {
            id: progress_id,
            trip_id,
            cursor: advanced.cursor,
            origin: leg.from,
            destination: leg.to,
            wait_eta: receipt.eta.unwrap_or(0),
            status: TripStatus::Requesting,
            request_id: receipt.request_id,
            ride_status: receipt.status,
            stops: advanced.stops,
            totals: advanced.totals,
            requested_at: Utc::now(),
        };
        if let Err(error) = self.store.insert_progress(progress.clone()).await {
            warn!(
                trip_id = %trip_id,
                cursor = progress.cursor,
                %error,
                "ride requested but progress snapshot not saved"
            );
        }

        info!(
            trip_id = %trip_id,
            cursor = progress.cursor,
            destination = %progress.destination,
            request_id = %progress.request_id,
            eta = progress.wait_eta,
            trip_status = %advanced.status,
            "ride requested"
        );

        Ok(progress)
    }

    /// Every progress snapshot of `trip_id`, oldest first.
    pub async fn history(&self, trip_id: TripId) -> Result<Vec<TripProgress>, TripError> {
        if self.store.get_trip(trip_id).await?.is_none() {
            return Err(TripError::TripNotFound(trip_id));
        }
        Ok(self.store.progress_for(trip_id).await?)
    }
}

/// A platform that was unreachable, overloaded or failing is unavailable;
/// one that answered and said no rejected the ride.
fn dispatch_error(failure: UpstreamFailure<RideError>) -> TripError {
    match failure.error() {
        Some(error) if !error.is_transport() && !error.is_transient() => {
            TripError::DispatchFailed(error.to_string())
        }
        _ => TripError::UpstreamUnavailable(failure.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn rejection_is_dispatch_failure() {
        let failure = UpstreamFailure::Failed {
            operation: "ride request",
            attempts: 1,
            error: RideError::Api {
                status: 422,
                message: "surge confirmation required".into(),
            },
        };
        assert!(matches!(dispatch_error(failure), TripError::DispatchFailed(_)));

        let failure = UpstreamFailure::Failed {
            operation: "ride request",
            attempts: 1,
            error: RideError::Unauthorized,
        };
        assert!(matches!(dispatch_error(failure), TripError::DispatchFailed(_)));
    }

    #[test]
    fn server_error_is_unavailable() {
        for error in [
            RideError::Api {
                status: 503,
                message: "service unavailable".into(),
            },
            RideError::RateLimited,
        ] {
            let failure = UpstreamFailure::Failed {
                operation: "ride request",
                attempts: 1,
                error,
            };
            assert!(matches!(
                dispatch_error(failure),
                TripError::UpstreamUnavailable(_)
            ));
        }
    }

    #[test]
    fn timeout_is_unavailable() {
        let failure = UpstreamFailure::<RideError>::TimedOut {
            operation: "ride request",
            timeout: Duration::from_secs(15),
            attempts: 1,
        };
        assert!(matches!(
            dispatch_error(failure),
            TripError::UpstreamUnavailable(_)
        ));
    }
}
