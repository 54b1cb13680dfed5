//! Backoff schedule for retryable provider failures.

use deck_core::ProviderConfig;
use rand::Rng;
use std::time::Duration;

/// Longest wait taken from a rate-limit reset header.
const MAX_RESET_WAIT: Duration = Duration::from_secs(60);
/// Margin added on top of a rate-limit reset time.
const RESET_MARGIN: Duration = Duration::from_secs(1);
/// Random spread added to exponential waits.
const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);
/// Minimum wait after a rate-limit response, grown by 1.5x per attempt.
const DEFAULT_RATE_LIMIT_FLOOR: Duration = Duration::from_millis(5000);

/// How often and how long to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound of the random jitter added to exponential waits.
    pub max_jitter: Duration,
    pub rate_limit_floor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            base_delay: Duration::from_millis(2000),
            max_jitter: DEFAULT_MAX_JITTER,
            rate_limit_floor: DEFAULT_RATE_LIMIT_FLOOR,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            ..Self::default()
        }
    }

    /// Wait before retrying after failed attempt `attempt` (zero-based).
    ///
    /// A known reset wait wins over the exponential schedule. Otherwise the
    /// wait is `base * 2^attempt` plus up to `max_jitter`, and rate-limited
    /// attempts wait at least the rate-limit floor.
    pub fn delay(&self, attempt: u32, rate_limited: bool, reset_wait: Option<Duration>) -> Duration {
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max_ms = self.max_jitter.as_millis() as u64;
            Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
        };
        self.delay_with_jitter(attempt, rate_limited, reset_wait, jitter)
    }

    /// [`delay`](Self::delay) with a caller-chosen jitter.
    pub fn delay_with_jitter(
        &self,
        attempt: u32,
        rate_limited: bool,
        reset_wait: Option<Duration>,
        jitter: Duration,
    ) -> Duration {
        if let Some(wait) = reset_wait {
            return (wait + RESET_MARGIN).min(MAX_RESET_WAIT);
        }

        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(attempt)) + jitter;
        if rate_limited {
            let floor = self.rate_limit_floor.mul_f64(1.5f64.powi(attempt as i32));
            exponential.max(floor)
        } else {
            exponential
        }
    }
}

/// Time until an `X-RateLimit-Reset` epoch-millisecond timestamp.
///
/// `None` when the value is unreadable or already in the past.
pub fn reset_wait(header: &str, now_ms: u64) -> Option<Duration> {
    let reset_ms: u64 = header.trim().parse().ok()?;
    (reset_ms > now_ms).then(|| Duration::from_millis(reset_ms - now_ms))
}
