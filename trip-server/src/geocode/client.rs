//! Geocoding HTTP client.
//!
//! Speaks the Google Geocoding API response format. Only the coordinates of
//! the first match are used.

use tracing::debug;

use crate::domain::{Address, Coordinates};
use crate::locations::Geocoder;

use super::error::GeocodeError;
use super::types::GeocodeResponse;

/// Default base URL for the geocoding API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// API key; sent as `key` when present
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Transport-level request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl GeocodeConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Geocoding API client.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Look up the coordinates of a free-form address.
    ///
    /// Returns `Ok(None)` when the geocoder has no match.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/json", self.base_url);
        let mut query = vec![("address", address)];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let found = first_match(parsed)?;
        debug!(address, found = ?found, "geocoded");
        Ok(found)
    }
}

/// Interpret a geocoding response: `OK` yields the first result,
/// `ZERO_RESULTS` yields nothing, anything else is an error.
fn first_match(response: GeocodeResponse) -> Result<Option<Coordinates>, GeocodeError> {
    match response.status.as_str() {
        "OK" => {
            let Some(result) = response.results.into_iter().next() else {
                return Ok(None);
            };
            let at = result.geometry.location;
            Coordinates::new(at.lat, at.lng)
                .map(Some)
                .map_err(|e| GeocodeError::Json {
                    message: e.to_string(),
                    body: None,
                })
        }
        "ZERO_RESULTS" => Ok(None),
        _ => Err(GeocodeError::Api {
            message: response.error_message.unwrap_or_default(),
            status: response.status,
        }),
    }
}

impl Geocoder for GeocodeClient {
    async fn geocode(&self, address: &Address) -> Result<Option<Coordinates>, GeocodeError> {
        self.lookup(&address.one_line()).await
    }
}
