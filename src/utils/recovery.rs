//! Connection recovery with exponential backoff
//!
//! Independent of the rate-limit executor: that one retries inside a single
//! call, this one decides whether the whole call chain should be re-run after
//! a connectivity failure. The attempt counter lives on the instance and is
//! shared by every concurrent caller, so it is atomic.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::models::{AppError, RecoveryConfig};

/// Tracks consecutive connection failures: 2s -> 4s -> 8s ... capped
#[derive(Debug)]
pub struct ConnectionManager {
    config: RecoveryConfig,
    attempts: AtomicU32,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(RecoveryConfig::default())
    }
}

impl ConnectionManager {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            attempts: AtomicU32::new(0),
        }
    }

    /// Consecutive failures recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// `min(base * 2^attempt, max)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.config
            .base_delay
            .saturating_mul(factor)
            .min(self.config.max_delay)
    }

    /// Record a connection failure for `service`.
    ///
    /// Below the cap: bump the counter, sleep the backoff and return `true`
    /// (caller retries from scratch). At the cap: return `false` immediately.
    pub async fn handle_connection_error(&self, error: &AppError, service: &str) -> bool {
        error!("🔌 Connection error for {}: {}", service, error);

        let max = self.config.max_attempts;
        let claimed = self
            .attempts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1));

        match claimed {
            Ok(previous) => {
                let attempt = previous + 1;
                let delay = self.delay_for(attempt);
                info!(
                    "🔄 Reconnecting to {} in {}ms... (attempt {}/{})",
                    service,
                    delay.as_millis(),
                    attempt,
                    max
                );
                tokio::time::sleep(delay).await;
                true
            }
            Err(_) => {
                warn!("💀 {} unreachable after {} reconnect attempts", service, max);
                false
            }
        }
    }

    /// Zero the counter after a successful call
    pub fn reset(&self) {
        let previous = self.attempts.swap(0, Ordering::SeqCst);
        if previous > 0 {
            info!("✅ Connection recovered after {} attempts, counter reset", previous);
        }
    }
}
