//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::num::ParseIntError;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::geocode::GeocodeConfig;
use crate::ride::RideConfig;
use crate::trips::TripConfig;
use crate::upstream::UpstreamPolicy;

/// Address the server binds to when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors from reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BIND_ADDR` is not a socket address
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    /// A numeric setting is not a non-negative integer
    #[error("invalid {name} {value:?}: {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        source: ParseIntError,
    },
}

/// Everything needed to assemble the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub ride: RideConfig,
    pub geocode: GeocodeConfig,
    pub cache: CacheConfig,
    pub trips: TripConfig,
    /// Guard for geocoding lookups.
    pub geocode_policy: UpstreamPolicy,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// Missing credentials are only warned about: the server starts, but
    /// calls to the ride platform or geocoder will be refused.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let server_token = var("RIDE_SERVER_TOKEN").unwrap_or_else(|| {
            warn!("RIDE_SERVER_TOKEN not set; price and product lookups will fail");
            String::new()
        });
        let access_token = var("RIDE_ACCESS_TOKEN").unwrap_or_else(|| {
            warn!("RIDE_ACCESS_TOKEN not set; ride requests will fail");
            String::new()
        });
        let mut ride = RideConfig::new(server_token, access_token);
        if let Some(url) = var("RIDE_BASE_URL") {
            ride = ride.with_base_url(url);
        }

        let api_key = var("GEOCODE_API_KEY");
        if api_key.is_none() {
            warn!("GEOCODE_API_KEY not set; geocoding requests are sent without a key");
        }
        let mut geocode = GeocodeConfig::new(api_key);
        if let Some(url) = var("GEOCODE_BASE_URL") {
            geocode = geocode.with_base_url(url);
        }

        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            var(name)
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|source| ConfigError::InvalidNumber {
                            name,
                            value: value.clone(),
                            source,
                        })
                })
                .transpose()
        };

        let mut cache = CacheConfig::default();
        if let Some(secs) = number("CATALOG_CACHE_TTL_SECS")? {
            cache = cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(n) = number("CATALOG_CACHE_CAPACITY")? {
            cache = cache.with_max_capacity(n);
        }

        let raw_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        Ok(Self {
            bind_addr,
            ride,
            geocode,
            cache,
            trips: TripConfig::default(),
            geocode_policy: UpstreamPolicy::default(),
        })
    }
}
