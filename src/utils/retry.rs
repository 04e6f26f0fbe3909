//! Rate-limit retry executor
//!
//! Wraps one remote call. Only rate-limit failures (HTTP 429 or an explicit
//! rate-limit body) are retried, with a linear schedule:
//! `base_delay * 1`, `base_delay * 2`, ... between attempts.
//! Every other failure goes straight back to the caller.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::models::{AppResult, RetryConfig};

/// Bounded retry-on-429 wrapper. Holds no per-call state; each
/// `execute_with_retry` keeps its own attempt counter.
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Wait applied after the `attempt`-th failure (1-indexed)
    #[inline]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.config.base_delay.saturating_mul(attempt)
    }

    /// Run `operation` up to `max_attempts` times, backing off linearly on
    /// rate limits. The last rate-limit error is returned once attempts run out.
    pub async fn execute_with_retry<T, F, Fut>(&self, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() => {
                    if attempt >= max_attempts {
                        warn!("🚫 Rate limit persisted after {} attempts", max_attempts);
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        "⏳ Rate limit hit, waiting {}ms... (attempt {}/{})",
                        delay.as_millis(),
                        attempt,
                        max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppError, ErrorCode};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn executor(max_attempts: u32, base_ms: u64) -> RetryExecutor {
        RetryExecutor::new(RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_rate_limit_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let start = Instant::now();

        let result: AppResult<()> = executor(3, 5000)
            .execute_with_retry(move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::rate_limited())
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExplorerRateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 5000 * 1 + 5000 * 2
        assert!(start.elapsed() >= Duration::from_millis(15_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;

        let result: AppResult<()> = executor(3, 5000)
            .execute_with_retry(move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::http_error(500))
            })
            .await;

        assert_eq!(result.unwrap_err().status, Some(500));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limit() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let start = Instant::now();

        let result = executor(3, 100)
            .execute_with_retry(move || async move {
                let n = calls_ref.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(AppError::http_error(429))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result = executor(0, 1)
            .execute_with_retry(move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>("done")
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_linear_schedule() {
        let exec = executor(3, 5000);
        assert_eq!(exec.delay_for(1), Duration::from_millis(5000));
        assert_eq!(exec.delay_for(2), Duration::from_millis(10_000));
        assert_eq!(exec.delay_for(3), Duration::from_millis(15_000));
    }
}
