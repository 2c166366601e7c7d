//! Bounded retry with exponential backoff and jitter around the captioning call.

use std::future::Future;
use std::time::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::utils::ServiceError;

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// Retry policy for calls to the captioning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt (milliseconds)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Growth factor between consecutive delays
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Pick each delay uniformly from `[0, delay]`
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Un-jittered delay before attempt `attempt + 1` (attempt is 1-based).
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(millis.min(self.max_delay_ms as f64) as u64)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let millis = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
        Duration::from_millis(millis)
    }

    /// Runs `op` until it succeeds, returns a non-retryable error, or the
    /// attempt budget is spent. Returns the final result and the number of
    /// attempts made.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> (Result<T, ServiceError>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return (Ok(value), attempt);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("{} failed with non-retryable error: {}", label, e);
                    return (Err(e), attempt);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!("{} failed after {} attempts: {}", label, attempt, e);
                    return (Err(e), attempt);
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {} (retrying in {}ms)",
                        label, attempt, max_attempts, e, delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
            jitter: true,
        }
    }

    #[test]
    fn base_delay_grows_and_caps() {
        let policy = RetryPolicy {
            initial_delay_ms: 100,
            max_delay_ms: 350,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.base_delay(1), Duration::from_millis(100));
        assert_eq!(policy.base_delay(2), Duration::from_millis(200));
        assert_eq!(policy.base_delay(3), Duration::from_millis(350));
    }

    #[test]
    fn jittered_delay_stays_within_base() {
        let policy = RetryPolicy {
            initial_delay_ms: 40,
            ..RetryPolicy::default()
        };
        for _ in 0..50 {
            assert!(policy.delay_for(2) <= policy.base_delay(2));
        }
    }

    #[test]
    fn deserializes_partial_policy_with_defaults() {
        let policy: RetryPolicy = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay_ms, 1_000);
        assert!(policy.jitter);
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let calls = Cell::new(0);
        let (result, attempts) = fast_policy(3)
            .run("describe", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(ServiceError::Network("connection refused".into()))
                    } else {
                        Ok("a lighthouse")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "a lighthouse");
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let (result, attempts) = fast_policy(2)
            .run("describe", || async { Err::<(), _>(ServiceError::Timeout(1)) })
            .await;
        assert_eq!(result.unwrap_err(), ServiceError::Timeout(1));
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let (result, attempts) = fast_policy(5)
            .run("describe", || async {
                Err::<(), _>(ServiceError::Status { status: 404, body: "model not found".into() })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
