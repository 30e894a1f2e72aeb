//! Bounded retry with a fixed inter-attempt delay.

use crate::error::{VenueError, VenueResult};
use arb_telemetry::Metrics;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Retry policy applied by every collaborator binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between attempts (ms). Default: 3,000.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    3_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry max_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> VenueResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = VenueResult<T>>,
    {
        let started = Instant::now();
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        let result = loop {
            match call().await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Collaborator call failed, retrying"
                    );
                    Metrics::collaborator_retry(operation);
                    tokio::time::sleep(self.delay()).await;
                    attempt += 1;
                }
                Err(e) => break Err(e),
            }
        };

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        Metrics::collaborator_latency(operation, latency_ms);
        if let Err(ref e) = result {
            debug!(operation, attempt, error = %e, "Collaborator call gave up");
        }
        result
    }
}

/// Convert a non-success HTTP response into `VenueError::Http`.
pub(crate) async fn check_status(response: reqwest::Response) -> VenueResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VenueError::Http {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_errors_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(VenueError::Transport("connection reset".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        let result: VenueResult<()> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(VenueError::Http {
                        status: 502,
                        body: "bad gateway".to_string(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(VenueError::Http { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_validation_error_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        let result: VenueResult<()> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(VenueError::Validation("bad".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(VenueError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_invalid() {
        let policy = RetryPolicy {
            max_attempts: 0,
            delay_ms: 0,
        };
        assert!(policy.validate().is_err());
    }
}
