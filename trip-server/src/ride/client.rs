//! Ride platform HTTP client.
//!
//! Provides async methods for price estimates, the product catalog and ride
//! requests. Handles authentication and limits concurrent requests.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::Coordinates;
use crate::trips::{PricingService, ProductCatalog, RideDispatcher};

use super::error::RideError;
use super::types::{PriceEstimate, PriceEstimates, Product, Products, RideReceipt, RideRequest};

/// Default base URL (sandbox) for the ride platform API.
const DEFAULT_BASE_URL: &str = "https://sandbox-api.uber.com/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the ride platform client.
#[derive(Debug, Clone)]
pub struct RideConfig {
    /// Server token, used for read-only endpoints (estimates, products)
    pub server_token: String,
    /// OAuth access token, used to request rides
    pub access_token: String,
    /// Base URL for the API (defaults to the sandbox)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Transport-level request timeout in seconds
    pub timeout_secs: u64,
}

impl RideConfig {
    /// Create a new config with the given tokens.
    pub fn new(server_token: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Ride platform API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct RideClient {
    http: reqwest::Client,
    base_url: String,
    server_auth: HeaderValue,
    bearer_auth: HeaderValue,
    semaphore: Arc<Semaphore>,
}

impl RideClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RideConfig) -> Result<Self, RideError> {
        let server_auth = HeaderValue::from_str(&format!("Token {}", config.server_token))
            .map_err(|_| RideError::NotConfigured("invalid server token format".to_string()))?;
        let bearer_auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| RideError::NotConfigured("invalid access token format".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            server_auth,
            bearer_auth,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Get price estimates between two points.
    pub async fn get_price_estimates(
        &self,
        start: Coordinates,
        end: Coordinates,
    ) -> Result<Vec<PriceEstimate>, RideError> {
        let _permit = self.permit().await?;

        let url = format!("{}/estimates/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.server_auth.clone())
            .query(&[
                ("start_latitude", start.lat().to_string()),
                ("start_longitude", start.lng().to_string()),
                ("end_latitude", end.lat().to_string()),
                ("end_longitude", end.lng().to_string()),
            ])
            .send()
            .await?;

        let estimates: PriceEstimates = decode(response).await?;
        debug!(%start, %end, count = estimates.prices.len(), "price estimates received");
        Ok(estimates.prices)
    }

    /// Get the ride products available at a location.
    pub async fn get_products(&self, at: Coordinates) -> Result<Vec<Product>, RideError> {
        let _permit = self.permit().await?;

        let url = format!("{}/products", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.server_auth.clone())
            .query(&[
                ("latitude", at.lat().to_string()),
                ("longitude", at.lng().to_string()),
            ])
            .send()
            .await?;

        let products: Products = decode(response).await?;
        debug!(%at, count = products.products.len(), "products received");
        Ok(products.products)
    }

    /// Request a ride.
    ///
    /// This creates a dispatch on the platform; callers must not blindly
    /// repeat it.
    pub async fn post_ride_request(&self, request: &RideRequest) -> Result<RideReceipt, RideError> {
        let _permit = self.permit().await?;

        let url = format!("{}/requests", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.bearer_auth.clone())
            .json(request)
            .send()
            .await?;

        decode(response).await
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>, RideError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| RideError::NotConfigured("semaphore closed".to_string()))
    }
}

/// Check the status of a response and decode its JSON body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RideError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RideError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(RideError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RideError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| RideError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

impl PricingService for RideClient {
    async fn price_estimates(
        &self,
        start: Coordinates,
        end: Coordinates,
    ) -> Result<Vec<PriceEstimate>, RideError> {
        self.get_price_estimates(start, end).await
    }
}

impl ProductCatalog for RideClient {
    async fn products(&self, at: Coordinates) -> Result<Vec<Product>, RideError> {
        self.get_products(at).await
    }
}

impl RideDispatcher for RideClient {
    async fn request_ride(&self, request: &RideRequest) -> Result<RideReceipt, RideError> {
        self.post_ride_request(request).await
    }
}
