use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{Error, Result};

/// Which failures are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    /// Any failure except cancellation and local input errors.
    AnyFailure,
    /// Only HTTP 429.
    RateLimited,
    Never,
}

/// Bounded retry with linear backoff (`base_delay * attempt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
    pub condition: RetryCondition,
    /// Applied to every attempt separately.
    pub attempt_timeout: Option<Duration>,
    /// Applied to the whole sequence, delays included.
    pub overall_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Gateway reads: `/api/me`, `/api/config`, `GET /api/settings`.
    pub const fn gateway() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(50),
            condition: RetryCondition::AnyFailure,
            attempt_timeout: None,
            overall_timeout: None,
        }
    }

    pub const fn file_listing() -> Self {
        Self {
            retries: 6,
            base_delay: Duration::from_millis(100),
            condition: RetryCondition::AnyFailure,
            attempt_timeout: None,
            overall_timeout: Some(Duration::from_millis(3_500)),
        }
    }

    pub const fn settings_save() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(50),
            condition: RetryCondition::RateLimited,
            attempt_timeout: Some(Duration::from_millis(4_000)),
            overall_timeout: None,
        }
    }

    pub const fn single_attempt(limit: Duration) -> Self {
        Self {
            retries: 0,
            base_delay: Duration::ZERO,
            condition: RetryCondition::Never,
            attempt_timeout: Some(limit),
            overall_timeout: None,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    pub fn should_retry(&self, err: &Error) -> bool {
        match self.condition {
            RetryCondition::Never => false,
            RetryCondition::RateLimited => err.status() == Some(429),
            RetryCondition::AnyFailure => !matches!(
                err,
                Error::Cancelled | Error::Invalid(_) | Error::NotReady | Error::Sdk(_)
            ),
        }
    }
}

/// Runs `op` under `policy`, returning the last error when attempts run out.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = async {
        let mut attempt = 0;
        loop {
            let result = match policy.attempt_timeout {
                Some(limit) => timeout(limit, op())
                    .await
                    .unwrap_or(Err(Error::Timeout(limit))),
                None => op().await,
            };
            match result {
                Ok(value) => return Ok(value),
                Err(e) if attempt < policy.retries && policy.should_retry(&e) => {
                    attempt += 1;
                    let delay = policy.delay_for(attempt);
                    debug!(
                        event_name = "clients.retry",
                        event_domain = "clients",
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after failure: {}",
                        e
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    };

    match policy.overall_timeout {
        Some(limit) => timeout(limit, attempts)
            .await
            .unwrap_or(Err(Error::Timeout(limit))),
        None => attempts.await,
    }
}
