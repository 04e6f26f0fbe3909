//! Seams between the poller and its remote collaborators.
//!
//! The poller only sees these traits, so tests can drive it with in-memory
//! fakes instead of Etherscan and Telegram.

use async_trait::async_trait;

use crate::models::{AppResult, TransferRecord, WatchedToken};

/// Source of ERC-20 transfer history plus its deduplication scope
#[async_trait]
pub trait TransferSource: Send + Sync {
    /// Transfers of `token_address` involving `target_address`, newest first
    async fn get_token_transfers(
        &self,
        token_address: &str,
        target_address: &str,
        start_block: u64,
    ) -> AppResult<Vec<TransferRecord>>;

    /// `true` exactly once per hash for the lifetime of the source
    fn is_new_transaction(&self, hash: &str) -> bool;
}

/// Outbound alert channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_deposit_alert(
        &self,
        token: &WatchedToken,
        transaction: &TransferRecord,
    ) -> AppResult<()>;

    async fn send_message(&self, text: &str) -> AppResult<()>;
}
