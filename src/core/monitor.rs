//! Polling orchestrator
//!
//! Every cycle checks all watched tokens concurrently, waits for every check
//! to finish, then sleeps for the polling interval. A failing token check is
//! logged and swallowed so it never delays or aborts the others.
//!
//! State machine: Idle -> Running -> Stopped. In Analysis mode the loop is
//! never started; `check_all_tokens` can still be driven manually.

use futures_util::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::{AppResult, MonitorState, MonitorStats, RunMode, WatchedToken};
use crate::providers::telegram::STARTUP_MESSAGE;
use crate::providers::traits::{Notifier, TransferSource};

/// Thread-safe counters
#[derive(Default)]
struct Counters {
    cycles_completed: AtomicU64,
    alerts_sent: AtomicU64,
    alerts_failed: AtomicU64,
    check_failures: AtomicU64,
}

/// Watches a fixed token list and forwards new deposits to the notifier
pub struct TokenMonitor<S, N> {
    mode: RunMode,
    polling_interval: Duration,
    /// Never mutated after construction
    tokens: Arc<[WatchedToken]>,
    source: Arc<S>,
    notifier: Arc<N>,
    state: watch::Sender<MonitorState>,
    counters: Counters,
}

impl<S, N> TokenMonitor<S, N>
where
    S: TransferSource + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        mode: RunMode,
        polling_interval: Duration,
        tokens: Arc<[WatchedToken]>,
        source: Arc<S>,
        notifier: Arc<N>,
    ) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        Self {
            mode,
            polling_interval,
            tokens,
            source,
            notifier,
            state,
            counters: Counters::default(),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    pub fn tokens(&self) -> &[WatchedToken] {
        &self.tokens
    }

    /// Start polling.
    ///
    /// Full mode: announce startup, move to Running and spawn the loop.
    /// Analysis mode (or a monitor that already left Idle): no loop, `None`.
    pub async fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.mode == RunMode::Analysis {
            info!("🔬 Token monitor started in ANALYSIS mode");
            return None;
        }

        if self.state() != MonitorState::Idle {
            warn!("⚠️ Monitor is {}, not starting", self.state().as_str());
            return None;
        }

        info!("🚀 Starting token monitor in FULL mode...");
        if let Err(e) = self.notifier.send_message(STARTUP_MESSAGE).await {
            warn!("⚠️ Startup notification failed: {}", e);
        }

        let started = self.state.send_if_modified(|state| {
            if *state == MonitorState::Idle {
                *state = MonitorState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            warn!("⚠️ Monitor is {}, not starting", self.state().as_str());
            return None;
        }

        info!(
            "👀 Watching {} tokens every {}ms",
            self.tokens.len(),
            self.polling_interval.as_millis()
        );

        let monitor = Arc::clone(self);
        Some(tokio::spawn(async move { monitor.monitor_loop().await }))
    }

    /// Poll until stopped. The inter-cycle sleep wakes early on `stop()`.
    pub async fn monitor_loop(&self) {
        let mut state_rx = self.state.subscribe();

        while self.is_running() {
            self.check_all_tokens().await;
            self.counters.cycles_completed.fetch_add(1, Ordering::Relaxed);

            if !self.is_running() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.polling_interval) => {}
                _ = state_rx.changed() => {}
            }
        }

        info!("🏁 Monitor loop finished");
    }

    /// One cycle: fan out a check per token and wait for all of them
    pub async fn check_all_tokens(&self) {
        let started = Instant::now();
        let checks = self.tokens.iter().map(|token| self.check_token(token));
        let alerts: usize = join_all(checks).await.into_iter().sum();

        debug!(
            "🔁 Cycle done: {} tokens, {} alerts, {}ms",
            self.tokens.len(),
            alerts,
            started.elapsed().as_millis()
        );
    }

    /// Check one token; errors are logged and counted, never propagated.
    /// Returns the number of alerts delivered.
    pub async fn check_token(&self, token: &WatchedToken) -> usize {
        match self.scan_deposits(token).await {
            Ok(sent) => sent,
            Err(e) => {
                self.counters.check_failures.fetch_add(1, Ordering::Relaxed);
                error!("❌ Error checking {}: {}", token.symbol, e);
                0
            }
        }
    }

    async fn scan_deposits(&self, token: &WatchedToken) -> AppResult<usize> {
        // The token address watches its own inbound transfers
        let transfers = self
            .source
            .get_token_transfers(&token.address, &token.address, 0)
            .await?;

        let mut sent = 0;
        for tx in transfers.iter().filter(|tx| tx.is_deposit_to(token)) {
            if !self.source.is_new_transaction(&tx.hash) {
                continue;
            }

            // The hash is recorded before delivery: at most one alert per tx
            match self.notifier.send_deposit_alert(token, tx).await {
                Ok(()) => {
                    sent += 1;
                    self.counters.alerts_sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.counters.alerts_failed.fetch_add(1, Ordering::Relaxed);
                    warn!("⚠️ {} alert for {} not delivered: {}", token.symbol, tx.hash, e);
                }
            }
        }

        Ok(sent)
    }

    /// Move to Stopped. No new cycle starts; an in-flight cycle finishes.
    pub fn stop(&self) {
        let previous = self.state.send_replace(MonitorState::Stopped);
        if previous != MonitorState::Stopped {
            info!("🛑 Token monitor stopped");
        }
    }

    pub fn get_stats(&self) -> MonitorStats {
        MonitorStats {
            cycles_completed: self.counters.cycles_completed.load(Ordering::Relaxed),
            alerts_sent: self.counters.alerts_sent.load(Ordering::Relaxed),
            alerts_failed: self.counters.alerts_failed.load(Ordering::Relaxed),
            check_failures: self.counters.check_failures.load(Ordering::Relaxed),
        }
    }
}
