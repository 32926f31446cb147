//! Timeouts and retry budgets for calls the trip engine makes.

use std::time::Duration;

use crate::upstream::UpstreamPolicy;

/// Configuration for trip planning and progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripConfig {
    /// Price estimate lookups (idempotent, retried).
    pub pricing: UpstreamPolicy,

    /// Product catalog lookups (idempotent, retried).
    pub catalog: UpstreamPolicy,

    /// Ride requests (never retried).
    pub dispatch: UpstreamPolicy,
}

impl TripConfig {
    pub fn new(pricing: UpstreamPolicy, catalog: UpstreamPolicy, dispatch: UpstreamPolicy) -> Self {
        Self {
            pricing,
            catalog,
            dispatch: UpstreamPolicy::once(dispatch.timeout),
        }
    }
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            pricing: UpstreamPolicy::default(),
            catalog: UpstreamPolicy::default(),
            dispatch: UpstreamPolicy::once(Duration::from_secs(15)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TripConfig::default();

        assert_eq!(config.pricing.timeout, Duration::from_secs(10));
        assert_eq!(config.pricing.max_attempts, 3);
        assert_eq!(config.catalog.backoff, Duration::from_millis(200));
        assert_eq!(config.dispatch.max_attempts, 1);
        assert_eq!(config.dispatch.timeout, Duration::from_secs(15));
    }

    #[test]
    fn dispatch_is_never_retried() {
        let retrying = UpstreamPolicy::default().with_max_attempts(5);
        let config = TripConfig::new(retrying, retrying, retrying);

        assert_eq!(config.pricing.max_attempts, 5);
        assert_eq!(config.dispatch.max_attempts, 1);
        assert_eq!(config.dispatch.timeout, retrying.timeout);
    }
}
