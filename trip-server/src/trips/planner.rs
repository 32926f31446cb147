//! Stop ordering for new trips.
//!
//! Every candidate stop is priced from the trip origin, never from the stop
//! visited before it, and the stops are then visited nearest-first. Legs are
//! not re-estimated relative to each other, so the order is a greedy
//! single-origin heuristic rather than a shortest tour.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::domain::{LegEstimate, Location, LocationId, TripId, TripPlan};
use crate::store::{LocationStore, TripStore};
use crate::upstream;

use super::config::TripConfig;
use super::error::TripError;
use super::provider::{PricingService, first_estimate};

/// Plans trips over saved locations.
pub struct TripPlanner<P, S> {
    pricing: Arc<P>,
    store: Arc<S>,
    config: TripConfig,
}

impl<P, S> TripPlanner<P, S>
where
    P: PricingService,
    S: LocationStore + TripStore,
{
    pub fn new(pricing: Arc<P>, store: Arc<S>, config: TripConfig) -> Self {
        Self {
            pricing,
            store,
            config,
        }
    }

    /// Order `candidates` and persist the resulting plan.
    ///
    /// Nothing is stored unless every candidate could be priced.
    pub async fn plan(
        &self,
        origin: LocationId,
        candidates: &[LocationId],
    ) -> Result<TripPlan, TripError> {
        validate_candidates(candidates)?;

        let store = &*self.store;
        let origin_location = resolve(store, origin).await?;
        let lookups: Vec<_> = candidates
            .iter()
            .map(|id| async move { resolve(store, *id).await })
            .collect();
        let stops = try_join_all(lookups).await?;

        debug!(
            origin = %origin,
            stops = stops.len(),
            "pricing candidate stops"
        );

        // One pricing call per stop, all from the origin. Results keep input order.
        let origin_location = &origin_location;
        let pricing: Vec<_> = stops
            .iter()
            .map(|stop| async move { self.estimate(origin_location, stop).await })
            .collect();
        let mut legs = try_join_all(pricing).await?;
        order_legs(&mut legs);

        let id = self.store.next_trip_id().await?;
        let plan = TripPlan::from_ordered_legs(id, origin, &legs, Utc::now());
        self.store.insert_trip(plan.clone()).await?;

        info!(
            trip_id = %plan.id,
            origin = %origin,
            stops = plan.stops.len(),
            distance = plan.totals.distance,
            cost = plan.totals.cost,
            "trip planned"
        );

        Ok(plan)
    }

    /// Look up a stored plan.
    pub async fn trip(&self, id: TripId) -> Result<TripPlan, TripError> {
        self.store
            .get_trip(id)
            .await?
            .ok_or(TripError::TripNotFound(id))
    }

    async fn estimate(&self, origin: &Location, stop: &Location) -> Result<LegEstimate, TripError> {
        let start = origin.coordinate;
        let end = stop.coordinate;

        let estimates = upstream::call(&self.config.pricing, "price estimate", || {
            self.pricing.price_estimates(start, end)
        })
        .await
        .map_err(|failure| {
            TripError::UpstreamUnavailable(format!("pricing location {}: {failure}", stop.id))
        })?;

        let estimate = first_estimate(estimates).ok_or_else(|| {
            TripError::UpstreamUnavailable(format!("no price estimate for location {}", stop.id))
        })?;

        debug!(
            stop = %stop.id,
            product = %estimate.product_id,
            distance = estimate.distance,
            "leg priced"
        );

        Ok(estimate.into_leg(stop.id))
    }
}

/// Load a saved location, mapping absence to [`TripError::LocationNotFound`].
pub(crate) async fn resolve<S: LocationStore>(
    store: &S,
    id: LocationId,
) -> Result<Location, TripError> {
    store
        .get_location(id)
        .await?
        .ok_or(TripError::LocationNotFound(id))
}

fn validate_candidates(candidates: &[LocationId]) -> Result<(), TripError> {
    if candidates.is_empty() {
        return Err(TripError::Validation(
            "at least one stop is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for id in candidates {
        if !seen.insert(*id) {
            return Err(TripError::Validation(format!(
                "location {id} is listed more than once"
            )));
        }
    }

    Ok(())
}

/// Sort by ascending distance from the origin. The sort is stable, so equal
/// distances keep the order the stops were requested in.
pub(crate) fn order_legs(legs: &mut [LegEstimate]) {
    legs.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
