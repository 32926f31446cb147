//! Tests for trip planning against the mock ride platform.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::testing::{Fixture, coords, save};
use super::*;
use crate::domain::{LocationId, TripId, TripStatus};
use crate::ride::MockFailure;
use crate::store::TripStore;

#[tokio::test]
async fn orders_stops_nearest_from_origin() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    let b = fx.stop("B", coords(0.02, 0.0), 2.0).await;
    let c = fx.stop("C", coords(0.08, 0.0), 8.0).await;

    let plan = fx.planner().plan(fx.origin, &[a, b, c]).await.unwrap();

    assert_eq!(plan.stops, vec![b, a, c]);
    assert_eq!(plan.origin, fx.origin);
    assert_eq!(plan.status, TripStatus::Planning);
    assert_eq!(plan.cursor, 0);
    assert_eq!(fx.platform.pricing_calls(), 3);
}

#[tokio::test]
async fn totals_sum_selected_estimates() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    let b = fx.stop("B", coords(0.02, 0.0), 2.0).await;
    let c = fx.stop("C", coords(0.08, 0.0), 8.0).await;

    let plan = fx.planner().plan(fx.origin, &[a, b, c]).await.unwrap();

    assert_eq!(plan.totals.distance, 15.0);
    assert_eq!(plan.totals.duration, 600 + 240 + 960);
    assert_eq!(plan.totals.cost, 15 + 9 + 21);
}

#[tokio::test]
async fn equal_distances_keep_request_order() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.01, 0.0), 3.0).await;
    let b = fx.stop("B", coords(0.0, 0.01), 3.0).await;
    let c = fx.stop("C", coords(0.01, 0.01), 1.0).await;

    let plan = fx.planner().plan(fx.origin, &[b, a, c]).await.unwrap();

    assert_eq!(plan.stops, vec![c, b, a]);
}

#[tokio::test]
async fn plan_is_persisted() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    let planner = fx.planner();

    let plan = planner.plan(fx.origin, &[a]).await.unwrap();

    assert_eq!(planner.trip(plan.id).await.unwrap(), plan);
    assert_eq!(fx.store.get_trip(plan.id).await.unwrap(), Some(plan));
}

#[tokio::test]
async fn unknown_trip_not_found() {
    let fx = Fixture::new().await;

    let err = fx.planner().trip(TripId::new(99)).await.unwrap_err();
    assert_eq!(err, TripError::TripNotFound(TripId::new(99)));
}

#[tokio::test]
async fn missing_estimate_fails_whole_plan() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    // Saved, but the platform has nothing to say about it.
    let b = save(&fx.store, "B", coords(0.02, 0.0)).await;

    let err = fx.planner().plan(fx.origin, &[a, b]).await.unwrap_err();

    assert!(matches!(err, TripError::UpstreamUnavailable(_)), "{err:?}");
    assert_eq!(fx.store.trip_count().await, 0);
}

#[tokio::test]
async fn unknown_stop_not_found() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    let ghost = LocationId::new(404).unwrap();

    let err = fx.planner().plan(fx.origin, &[a, ghost]).await.unwrap_err();

    assert_eq!(err, TripError::LocationNotFound(ghost));
    assert_eq!(fx.platform.pricing_calls(), 0);
    assert_eq!(fx.store.trip_count().await, 0);
}

#[tokio::test]
async fn unknown_origin_not_found() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    let ghost = LocationId::new(404).unwrap();

    let err = fx.planner().plan(ghost, &[a]).await.unwrap_err();

    assert_eq!(err, TripError::LocationNotFound(ghost));
}

#[tokio::test]
async fn duplicate_stops_rejected() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;

    let err = fx.planner().plan(fx.origin, &[a, a]).await.unwrap_err();

    assert!(matches!(err, TripError::Validation(_)));
    assert_eq!(fx.platform.total_calls(), 0);
}

#[tokio::test]
async fn empty_stop_list_rejected() {
    let fx = Fixture::new().await;

    let err = fx.planner().plan(fx.origin, &[]).await.unwrap_err();

    assert_eq!(
        err,
        TripError::Validation("at least one stop is required".into())
    );
}

#[tokio::test]
async fn storage_failure_surfaces() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    fx.store.set_read_only(true);

    let err = fx.planner().plan(fx.origin, &[a]).await.unwrap_err();

    assert!(matches!(err, TripError::Storage(_)), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn transient_pricing_failure_retried() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    fx.platform.fail_pricing(MockFailure::Unavailable);
    fx.platform.fail_pricing(MockFailure::Unavailable);

    let plan = fx.planner().plan(fx.origin, &[a]).await.unwrap();

    assert_eq!(plan.stops, vec![a]);
    assert_eq!(fx.platform.pricing_calls(), 3);
}

#[tokio::test]
async fn rejected_pricing_not_retried() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    fx.platform.fail_pricing(MockFailure::Rejected(401));

    let err = fx.planner().plan(fx.origin, &[a]).await.unwrap_err();

    assert!(matches!(err, TripError::UpstreamUnavailable(_)));
    assert_eq!(fx.platform.pricing_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_pricing_times_out() {
    let fx = Fixture::new().await;
    let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
    for _ in 0..3 {
        fx.platform.fail_pricing(MockFailure::Hang);
    }

    let err = fx.planner().plan(fx.origin, &[a]).await.unwrap_err();

    match err {
        TripError::UpstreamUnavailable(message) => assert!(message.contains("timed out")),
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
    assert_eq!(fx.platform.pricing_calls(), 3);
    assert_eq!(fx.store.trip_count().await, 0);
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The plan visits every requested stop exactly once, nearest first,
    /// with ties in request order.
    #[test]
    fn plan_is_stable_sorted_permutation(distances in prop::collection::vec(0u8..6, 1..8)) {
        let (requested, plan) = runtime().block_on(async {
            let fx = Fixture::new().await;
            let mut requested = Vec::new();
            for (i, d) in distances.iter().enumerate() {
                let at = coords(0.01 * (i + 1) as f64, 0.0);
                requested.push(fx.stop(&format!("S{i}"), at, f64::from(*d)).await);
            }
            let plan = fx.planner().plan(fx.origin, &requested).await.unwrap();
            (requested, plan)
        });

        let mut expected: Vec<usize> = (0..requested.len()).collect();
        expected.sort_by_key(|i| distances[*i]);
        let expected: Vec<LocationId> = expected.into_iter().map(|i| requested[i]).collect();

        prop_assert_eq!(plan.stops.len(), requested.len());
        prop_assert_eq!(plan.stops, expected);
        let total: f64 = distances.iter().map(|d| f64::from(*d)).sum();
        prop_assert_eq!(plan.totals.distance, total);
    }

    /// Plans created at the same time never share an id.
    #[test]
    fn concurrent_plans_get_distinct_ids(n in 2usize..16) {
        let ids = runtime().block_on(async {
            let fx = Fixture::new().await;
            let a = fx.stop("A", coords(0.05, 0.0), 5.0).await;
            let planner = Arc::new(fx.planner());
            let origin = fx.origin;

            let handles: Vec<_> = (0..n)
                .map(|_| {
                    let planner = planner.clone();
                    tokio::spawn(async move { planner.plan(origin, &[a]).await })
                })
                .collect();

            let mut ids = Vec::new();
            for handle in handles {
                ids.push(handle.await.unwrap().unwrap().id);
            }
            ids
        });

        let unique: HashSet<TripId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), n);
    }
}
