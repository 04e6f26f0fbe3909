//! Configuration module for Token Watch
//!
//! Defaults come from utils/constants.rs; everything else is read from the
//! environment once at startup and then handed around as plain structs.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::errors::{AppError, AppResult};
use super::types::WatchedToken;
use crate::utils::constants::{
    DEFAULT_API_PORT, DEFAULT_ETHERSCAN_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_MAX_RETRIES, DEFAULT_POLLING_INTERVAL_MS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TELEGRAM_API_URL, RECONNECT_BASE_DELAY_MS,
    RECONNECT_MAX_DELAY_MS, WATCHED_TOKENS,
};

/// How the poller behaves once started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Continuous polling with alerts
    Full,
    /// No polling loop; manual/one-shot use only
    Analysis,
}

impl RunMode {
    /// `NODE_ENV=analysis` selects Analysis, anything else Full
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("analysis") => Self::Analysis,
            _ => Self::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Full => "FULL",
            RunMode::Analysis => "ANALYSIS",
        }
    }
}

/// Rate-limit retry policy (linear backoff)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait before retry n is `base_delay * n`
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Connection recovery policy (exponential backoff)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_delay: Duration::from_millis(RECONNECT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RECONNECT_MAX_DELAY_MS),
        }
    }
}

/// Etherscan client settings
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub api_key: String,
    pub http_timeout: Duration,
    pub retry: RetryConfig,
    pub recovery: RecoveryConfig,
}

impl ExplorerConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Telegram bot settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub http_timeout: Duration,
}

/// Top-level configuration for the poller and its collaborators
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub mode: RunMode,
    pub polling_interval: Duration,
    pub explorer: ExplorerConfig,
    pub telegram: TelegramConfig,
    /// Immutable after load
    pub tokens: Arc<[WatchedToken]>,
}

impl MonitorConfig {
    /// Load everything from the environment.
    ///
    /// Credentials are only mandatory in Full mode, where the poller
    /// actually talks to Etherscan and Telegram.
    pub fn from_env() -> AppResult<Self> {
        let mode = RunMode::from_env_value(std::env::var("NODE_ENV").ok().as_deref());
        let http_timeout = Duration::from_secs(env_or("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?);

        let explorer = ExplorerConfig {
            base_url: env_string_or("ETHERSCAN_BASE_URL", DEFAULT_ETHERSCAN_BASE_URL),
            api_key: required_in(mode, "ETHERSCAN_API_KEY")?,
            http_timeout,
            retry: RetryConfig {
                max_attempts: env_or("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
                base_delay: Duration::from_millis(env_or("RETRY_DELAY", DEFAULT_RETRY_DELAY_MS)?),
            },
            recovery: RecoveryConfig {
                max_attempts: env_or("MAX_RECONNECT_ATTEMPTS", DEFAULT_MAX_RECONNECT_ATTEMPTS)?,
                ..RecoveryConfig::default()
            },
        };

        let telegram = TelegramConfig {
            api_url: env_string_or("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            bot_token: required_in(mode, "TELEGRAM_BOT_TOKEN")?,
            chat_id: required_in(mode, "CHAT_ID")?,
            http_timeout,
        };

        let config = Self {
            mode,
            polling_interval: Duration::from_millis(env_or("POLLING_INTERVAL", DEFAULT_POLLING_INTERVAL_MS)?),
            explorer,
            telegram,
            tokens: load_watch_list()?,
        };

        info!(
            "⚙️ Config loaded: mode={}, interval={}ms, tokens={}",
            config.mode.as_str(),
            config.polling_interval.as_millis(),
            config.tokens.len()
        );

        Ok(config)
    }
}

/// Listen port for the status API (`PORT`)
pub fn api_port() -> AppResult<u16> {
    env_or("PORT", DEFAULT_API_PORT)
}

/// Build the watch-list from the static token table plus env addresses.
/// Entries without a configured address are skipped.
pub fn load_watch_list() -> AppResult<Arc<[WatchedToken]>> {
    let mut tokens = Vec::with_capacity(WATCHED_TOKENS.len());

    for spec in WATCHED_TOKENS.iter() {
        match std::env::var(spec.address_env) {
            Ok(address) if !address.trim().is_empty() => {
                tokens.push(WatchedToken::new(
                    address.trim(),
                    spec.symbol,
                    spec.name,
                    spec.decimals,
                    spec.emoji,
                )?);
            }
            _ => warn!("⚠️ {} not set, {} will not be watched", spec.address_env, spec.symbol),
        }
    }

    Ok(tokens.into())
}

fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_config(key, &raw)),
        _ => Ok(default),
    }
}

fn required_in(mode: RunMode, key: &str) -> AppResult<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ if mode == RunMode::Analysis => Ok(String::new()),
        _ => Err(AppError::missing_env(key)),
    }
}
