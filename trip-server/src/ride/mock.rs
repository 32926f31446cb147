//! In-process stand-in for the ride platform.
//!
//! Serves scripted price estimates, products and ride receipts, and counts
//! every call so tests can assert on how often each endpoint was reached.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::Coordinates;
use crate::trips::{PricingService, ProductCatalog, RideDispatcher};

use super::error::RideError;
use super::types::{PriceEstimate, Product, RideReceipt, RideRequest};

/// A scripted failure for the next call to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Platform answers with a 503.
    Unavailable,
    /// Platform rejects the call with the given 4xx status.
    Rejected(u16),
    /// Platform answers 200 with a body that does not decode.
    Malformed,
    /// Platform never answers.
    Hang,
}

impl MockFailure {
    fn into_error(self) -> RideError {
        match self {
            MockFailure::Unavailable => RideError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            },
            MockFailure::Rejected(status) => RideError::Api {
                status,
                message: "rejected".to_string(),
            },
            MockFailure::Malformed => RideError::Json {
                message: "missing field `request_id`".to_string(),
                body: Some("{}".to_string()),
            },
            MockFailure::Hang => RideError::Api {
                status: 504,
                message: "gateway timeout".to_string(),
            },
        }
    }
}

#[derive(Default)]
struct Script {
    estimates: HashMap<(u64, u64), Vec<PriceEstimate>>,
    products: Vec<Product>,
    pricing_failures: VecDeque<MockFailure>,
    catalog_failures: VecDeque<MockFailure>,
    dispatch_failures: VecDeque<MockFailure>,
    requests: Vec<RideRequest>,
    eta: Option<u32>,
}

#[derive(Default)]
struct Counters {
    pricing: AtomicUsize,
    catalog: AtomicUsize,
    dispatch: AtomicUsize,
}

/// Mock ride platform implementing all three ride collaborators.
#[derive(Clone, Default)]
pub struct MockRidePlatform {
    script: Arc<Mutex<Script>>,
    counters: Arc<Counters>,
}

fn key(at: Coordinates) -> (u64, u64) {
    (at.lat().to_bits(), at.lng().to_bits())
}

impl MockRidePlatform {
    /// A platform with one default product and no estimates.
    pub fn new() -> Self {
        let platform = Self::default();
        platform.set_products(vec![Product {
            product_id: "uberX".to_string(),
            description: "Economy".to_string(),
            display_name: "uberX".to_string(),
            capacity: 4,
            image: None,
        }]);
        platform.set_eta(4);
        platform
    }

    /// Serve `estimates` for any trip ending at `destination`.
    pub fn set_estimates(&self, destination: Coordinates, estimates: Vec<PriceEstimate>) {
        self.lock().estimates.insert(key(destination), estimates);
    }

    /// Serve a single estimate with the given distance, duration and low cost.
    pub fn set_estimate(&self, destination: Coordinates, distance: f64, duration: u64, low: u64) {
        self.set_estimates(
            destination,
            vec![PriceEstimate {
                product_id: "uberX".to_string(),
                currency_code: Some("USD".to_string()),
                display_name: "uberX".to_string(),
                estimate: format!("${low}-{}", low + 4),
                low_estimate: Some(low),
                high_estimate: Some(low + 4),
                surge_multiplier: 1.0,
                duration,
                distance,
            }],
        );
    }

    pub fn set_products(&self, products: Vec<Product>) {
        self.lock().products = products;
    }

    pub fn set_eta(&self, eta: u32) {
        self.lock().eta = Some(eta);
    }

    /// Answer ride requests with a null `eta`.
    pub fn clear_eta(&self) {
        self.lock().eta = None;
    }

    pub fn fail_pricing(&self, failure: MockFailure) {
        self.lock().pricing_failures.push_back(failure);
    }

    pub fn fail_catalog(&self, failure: MockFailure) {
        self.lock().catalog_failures.push_back(failure);
    }

    pub fn fail_dispatch(&self, failure: MockFailure) {
        self.lock().dispatch_failures.push_back(failure);
    }

    pub fn pricing_calls(&self) -> usize {
        self.counters.pricing.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> usize {
        self.counters.catalog.load(Ordering::SeqCst)
    }

    pub fn dispatch_calls(&self) -> usize {
        self.counters.dispatch.load(Ordering::SeqCst)
    }

    /// Total calls across every endpoint.
    pub fn total_calls(&self) -> usize {
        self.pricing_calls() + self.catalog_calls() + self.dispatch_calls()
    }

    /// Ride requests that were accepted, in order.
    pub fn requests(&self) -> Vec<RideRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from the others.
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn fail(failure: MockFailure) -> RideError {
    if failure == MockFailure::Hang {
        std::future::pending::<()>().await;
    }
    failure.into_error()
}

impl PricingService for MockRidePlatform {
    async fn price_estimates(
        &self,
        _start: Coordinates,
        end: Coordinates,
    ) -> Result<Vec<PriceEstimate>, RideError> {
        self.counters.pricing.fetch_add(1, Ordering::SeqCst);
        let scripted = {
            let mut script = self.lock();
            match script.pricing_failures.pop_front() {
                Some(failure) => Err(failure),
                None => Ok(script.estimates.get(&key(end)).cloned().unwrap_or_default()),
            }
        };
        match scripted {
            Ok(estimates) => Ok(estimates),
            Err(failure) => Err(fail(failure).await),
        }
    }
}

impl ProductCatalog for MockRidePlatform {
    async fn products(&self, _at: Coordinates) -> Result<Vec<Product>, RideError> {
        self.counters.catalog.fetch_add(1, Ordering::SeqCst);
        let scripted = {
            let mut script = self.lock();
            match script.catalog_failures.pop_front() {
                Some(failure) => Err(failure),
                None => Ok(script.products.clone()),
            }
        };
        match scripted {
            Ok(products) => Ok(products),
            Err(failure) => Err(fail(failure).await),
        }
    }
}

impl RideDispatcher for MockRidePlatform {
    async fn request_ride(&self, request: &RideRequest) -> Result<RideReceipt, RideError> {
        let n = self.counters.dispatch.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = {
            let mut script = self.lock();
            match script.dispatch_failures.pop_front() {
                Some(failure) => Err(failure),
                None => {
                    script.requests.push(request.clone());
                    Ok(script.eta)
                }
            }
        };
        match scripted {
            Ok(eta) => Ok(RideReceipt {
                request_id: format!("request-{n}"),
                status: "processing".to_string(),
                eta,
                surge_multiplier: None,
                driver: None,
                vehicle: None,
                location: None,
            }),
            Err(failure) => Err(fail(failure).await),
        }
    }
}
