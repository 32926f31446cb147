//! Geocoding client error types.

/// Errors from the geocoding HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Non-success HTTP status.
    #[error("geocoder returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The geocoder answered with an error status in the body
    /// (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...).
    #[error("geocoder error {status}: {message}")]
    Api { status: String, message: String },

    /// Client could not be configured.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl GeocodeError {
    /// Whether repeating the same lookup may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GeocodeError::Status { status, .. } => *status >= 500 || *status == 429,
            GeocodeError::Api { status, .. } => {
                status == "OVER_QUERY_LIMIT" || status == "UNKNOWN_ERROR"
            }
            GeocodeError::Json { .. } | GeocodeError::NotConfigured(_) => false,
        }
    }
}
