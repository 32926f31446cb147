//! Ride platform client error types.

/// Errors from the ride platform HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum RideError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API.
    #[error("rate limited by ride platform")]
    RateLimited,

    /// Invalid or missing token.
    #[error("unauthorized (check RIDE_SERVER_TOKEN / RIDE_ACCESS_TOKEN)")]
    Unauthorized,

    /// Client could not be configured.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl RideError {
    /// Whether repeating the same request may succeed.
    ///
    /// Network failures, rate limiting and 5xx responses are transient;
    /// anything the platform rejected on its merits is not.
    pub fn is_transient(&self) -> bool {
        match self {
            RideError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RideError::Api { status, .. } => *status >= 500,
            RideError::RateLimited => true,
            RideError::Json { .. } | RideError::Unauthorized | RideError::NotConfigured(_) => {
                false
            }
        }
    }

    /// Whether the failure happened before the platform gave an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RideError::Http(_))
    }
}
