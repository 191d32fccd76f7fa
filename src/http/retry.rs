//! Caller-side retry with exponential backoff for transient fetch failures.
//!
//! The fetcher itself never retries. Crawl flows wrap their fetches in
//! [`with_retry`], which consults a [`RetryPolicy`]. The default policy makes a
//! single attempt, so a failure is reported to the caller immediately.
//!
//! # Example
//!
//! ```
//! use crawler_core::http::{FetchError, FailureType, RetryDecision, RetryPolicy, classify_error};
//! use crawler_core::pacing::FixedEntropy;
//!
//! let policy = RetryPolicy::with_max_attempts(3);
//! let error = FetchError::http_status("https://example.com/paper.full.pdf", 503);
//!
//! match policy.should_retry(classify_error(&error), 1, &FixedEntropy::new(0, 0.0)) {
//!     RetryDecision::Retry { delay, attempt } => println!("retry #{attempt} in {delay:?}"),
//!     RetryDecision::DoNotRetry { reason } => println!("giving up: {reason}"),
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, instrument};

use super::FetchError;
use crate::pacing::{Entropy, Sleeper};

/// Default maximum attempts (a single try, no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of fetch failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry (timeouts, 5xx, 429, connection errors).
    Transient,

    /// Failure that will not change on retry (404, invalid URL, local IO).
    Permanent,
}

/// Decision on whether to retry a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Exponential backoff configuration.
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings. `max_attempts` is at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(
            max_attempts,
            DEFAULT_BASE_DELAY,
            DEFAULT_MAX_DELAY,
            DEFAULT_BACKOFF_MULTIPLIER,
        )
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(skip(self, entropy), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(
        &self,
        failure_type: FailureType,
        attempt: u32,
        entropy: &dyn Entropy,
    ) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt, entropy);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn calculate_delay(&self, attempt: u32, entropy: &dyn Entropy) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * self.backoff_multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        let jitter = entropy.between(Duration::ZERO, MAX_JITTER);
        Duration::from_millis(capped_ms as u64) + jitter
    }
}

/// Classifies a fetch error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout, Network | Transient |
/// | HTTP 408, 429, 5xx | Transient |
/// | Other HTTP statuses | Permanent |
/// | Io, InvalidUrl | Permanent |
#[must_use]
pub fn classify_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::Timeout { .. } | FetchError::Network { .. } => FailureType::Transient,
        FetchError::HttpStatus { status, .. } => match status {
            408 | 429 | 500..=599 => FailureType::Transient,
            _ => FailureType::Permanent,
        },
        FetchError::Io { .. } | FetchError::InvalidUrl { .. } => FailureType::Permanent,
    }
}

/// Runs `op` until it succeeds or the policy gives up.
///
/// `op` receives the 1-indexed attempt number so it can rotate identities per attempt.
///
/// # Errors
///
/// Returns the last [`FetchError`] once the policy declines to retry.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    entropy: &dyn Entropy,
    sleeper: &dyn Sleeper,
    url: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => match policy.should_retry(classify_error(&error), attempt, entropy) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    info!(
                        url,
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying fetch"
                    );
                    sleeper.sleep(delay).await;
                    attempt = next_attempt;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url, %reason, "not retrying fetch");
                    return Err(error);
                }
            },
        }
    }
}
