//! Type definitions for Token Watch
//! Core data structures shared by the explorer client, notifier and poller

use alloy_primitives::{Address, U256};
use serde::Serialize;
use std::str::FromStr;

use super::errors::{AppError, AppResult};

/// A token contract on the watch-list.
///
/// Loaded once at startup and shared read-only between concurrent checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedToken {
    /// Contract address (0x-prefixed hex, as configured)
    pub address: String,
    /// Ticker symbol (e.g. "PUFFER")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// ERC-20 decimals used to scale raw transfer values
    pub decimals: u8,
    /// Presentation tag shown around alerts
    pub emoji: String,
}

impl WatchedToken {
    /// Build a token entry, rejecting malformed addresses
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
        emoji: impl Into<String>,
    ) -> AppResult<Self> {
        let address = address.into();
        if Address::from_str(&address).is_err() || !address.starts_with("0x") {
            return Err(AppError::invalid_address(format!(
                "Invalid token address: {}",
                address
            )));
        }

        Ok(Self {
            address,
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            emoji: emoji.into(),
        })
    }

    /// Whether `address` refers to this token (hex casing ignored)
    #[inline]
    pub fn matches_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

/// One ERC-20 transfer as reported by the explorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Raw on-chain amount, scaled by the token's decimals
    pub value: U256,
    pub block_number: u64,
    /// Unix seconds
    pub timestamp: u64,
}

impl TransferRecord {
    /// A deposit is a transfer whose destination is the watched address
    pub fn is_deposit_to(&self, token: &WatchedToken) -> bool {
        token.matches_address(&self.to)
    }
}

/// Lifecycle of the polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

impl MonitorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::Idle => "IDLE",
            MonitorState::Running => "RUNNING",
            MonitorState::Stopped => "STOPPED",
        }
    }
}

/// Poller counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    /// Poll cycles finished
    pub cycles_completed: u64,
    /// Deposit alerts delivered
    pub alerts_sent: u64,
    /// Alerts the notifier failed to deliver
    pub alerts_failed: u64,
    /// Token checks that ended in an error
    pub check_failures: u64,
}
