//! Timeout and bounded retry for calls to external services.
//!
//! Every call to the ride platform, the geocoder or any other upstream goes
//! through [`call`]. Each attempt gets its own deadline; transient failures
//! are retried with a linear backoff until the attempt budget runs out.
//! Calls with side effects use a policy with a single attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How one kind of upstream call is guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamPolicy {
    /// Deadline for a single attempt.
    pub timeout: Duration,

    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,

    /// Wait before retry `n` is `backoff * (n - 1)`.
    pub backoff: Duration,
}

impl UpstreamPolicy {
    pub fn new(timeout: Duration, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy for calls that must not be repeated.
    pub fn once(timeout: Duration) -> Self {
        Self::new(timeout, 1, Duration::ZERO)
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the attempt budget.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the linear backoff step.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before attempt number `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff * attempt.saturating_sub(1)
    }
}

impl Default for UpstreamPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 3, Duration::from_millis(200))
    }
}

/// Errors that know whether repeating the call may help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for crate::ride::RideError {
    fn is_transient(&self) -> bool {
        crate::ride::RideError::is_transient(self)
    }
}

impl Transient for crate::geocode::GeocodeError {
    fn is_transient(&self) -> bool {
        crate::geocode::GeocodeError::is_transient(self)
    }
}

/// Why a guarded call gave up.
#[derive(Debug)]
pub enum UpstreamFailure<E> {
    /// The last attempt did not finish within the policy timeout.
    TimedOut {
        operation: &'static str,
        timeout: Duration,
        attempts: u32,
    },

    /// The last attempt returned an error.
    Failed {
        operation: &'static str,
        attempts: u32,
        error: E,
    },
}

impl<E> UpstreamFailure<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamFailure::TimedOut { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            UpstreamFailure::TimedOut { attempts, .. } | UpstreamFailure::Failed { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The upstream error, if the call did not time out.
    pub fn error(&self) -> Option<&E> {
        match self {
            UpstreamFailure::TimedOut { .. } => None,
            UpstreamFailure::Failed { error, .. } => Some(error),
        }
    }
}

impl<E: fmt::Display> fmt::Display for UpstreamFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamFailure::TimedOut {
                operation,
                timeout,
                attempts,
            } => write!(
                f,
                "{operation} timed out after {timeout:?} ({attempts} attempt(s))"
            ),
            UpstreamFailure::Failed {
                operation,
                attempts,
                error,
            } => write!(f, "{operation} failed after {attempts} attempt(s): {error}"),
        }
    }
}

impl<E> std::error::Error for UpstreamFailure<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamFailure::TimedOut { .. } => None,
            UpstreamFailure::Failed { error, .. } => Some(error),
        }
    }
}

/// Run `attempt` under `policy`.
///
/// `attempt` is invoked once per try and must build a fresh request each
/// time. Non-transient errors end the call immediately.
pub async fn call<T, E, F, Fut>(
    policy: &UpstreamPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, UpstreamFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + fmt::Display,
{
    let mut n = 1;
    loop {
        match tokio::time::timeout(policy.timeout, attempt()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => {
                if !error.is_transient() || n >= policy.max_attempts {
                    return Err(UpstreamFailure::Failed {
                        operation,
                        attempts: n,
                        error,
                    });
                }
                warn!(operation, attempt = n, %error, "upstream call failed, retrying");
            }
            Err(_) => {
                if n >= policy.max_attempts {
                    return Err(UpstreamFailure::TimedOut {
                        operation,
                        timeout: policy.timeout,
                        attempts: n,
                    });
                }
                warn!(operation, attempt = n, timeout = ?policy.timeout, "upstream call timed out, retrying");
            }
        }

        n += 1;
        tokio::time::sleep(policy.delay_before(n)).await;
    }
}
