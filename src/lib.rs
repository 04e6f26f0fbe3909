//! Token Watch Library
//!
//! ERC-20 deposit watcher:
//! - Polls Etherscan token transfers for a fixed watch-list
//! - Retries rate-limited calls with linear backoff
//! - Recovers from connectivity failures with capped exponential backoff
//! - Deduplicates transactions so each deposit alerts once
//! - Forwards deposits to a Telegram chat

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::TokenMonitor;
pub use models::{
    AppError, AppResult, ErrorCode, ExplorerConfig, MonitorConfig, MonitorState, MonitorStats,
    RecoveryConfig, RetryConfig, RunMode, TelegramConfig, TransferRecord, WatchedToken,
};
pub use providers::{EtherscanClient, Notifier, TelegramNotifier, TransferSource};
pub use utils::{ConnectionManager, RetryExecutor, TransactionDeduplicator};
