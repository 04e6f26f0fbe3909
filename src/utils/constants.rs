//! Constants Module - Single Source of Truth
//!
//! Every default, endpoint and watch-list entry lives here.
//! Other modules read these instead of hardcoding values.

use alloy_primitives::U256;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "TokenWatch";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("TokenWatch/", env!("CARGO_PKG_VERSION"));

// ============================================
// ENDPOINTS
// ============================================

/// Etherscan API endpoint
pub const DEFAULT_ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/api";

/// Transaction page prefix used in alerts
pub const ETHERSCAN_TX_URL: &str = "https://etherscan.io/tx/";

/// Telegram Bot API endpoint
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

// ============================================
// POLLING & RETRY DEFAULTS
// ============================================

/// Pause between poll cycles (milliseconds)
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 60_000;

/// Attempts per explorer call while rate limited
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Linear rate-limit backoff unit (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Consecutive connection failures tolerated before giving up
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Reconnect backoff: 1s -> 2s -> 4s ... capped at 30s
pub const RECONNECT_BASE_DELAY_MS: u64 = 1_000;
pub const RECONNECT_MAX_DELAY_MS: u64 = 30_000;

/// Timeout for a single HTTP request (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Telegram getUpdates long-poll window (seconds)
pub const TELEGRAM_LONG_POLL_SECS: u64 = 30;

/// Status page port
pub const DEFAULT_API_PORT: u16 = 3000;

/// Fractional digits shown in deposit alerts
pub const AMOUNT_DISPLAY_DECIMALS: u8 = 6;

// ============================================
// WATCH-LIST
// ============================================

/// Static description of a watched token; the address comes from the environment
#[derive(Debug, Clone, Copy)]
pub struct TokenSpec {
    pub address_env: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub decimals: u8,
}

/// Tokens under observation
pub const WATCHED_TOKENS: [TokenSpec; 3] = [
    TokenSpec {
        address_env: "CARROT_TOKEN_ADDRESS",
        symbol: "CARROT",
        name: "CARROT Token",
        emoji: "🥕",
        decimals: 18,
    },
    TokenSpec {
        address_env: "PUFFER_TOKEN_ADDRESS",
        symbol: "PUFFER",
        name: "Puffer Finance Token",
        emoji: "🐡",
        decimals: 18,
    },
    TokenSpec {
        address_env: "PUFETH_TOKEN_ADDRESS",
        symbol: "pufETH",
        name: "Puffer ETH",
        emoji: "💎",
        decimals: 18,
    },
];

// ============================================
// CONVERSION UTILITIES
// ============================================

/// Render a raw token amount with `AMOUNT_DISPLAY_DECIMALS` fractional digits.
///
/// Integer arithmetic throughout, rounding half up.
pub fn format_token_amount(value: U256, decimals: u8) -> String {
    let precision = AMOUNT_DISPLAY_DECIMALS as usize;
    let ten = U256::from(10u8);

    let scaled = if decimals as usize >= precision {
        let divisor = ten.pow(U256::from(decimals as usize - precision));
        let half = divisor / U256::from(2u8);
        // saturating keeps U256::MAX from wrapping to zero
        value.saturating_add(half) / divisor
    } else {
        value.saturating_mul(ten.pow(U256::from(precision - decimals as usize)))
    };

    let unit = ten.pow(U256::from(precision));
    let whole = scaled / unit;
    let frac = scaled % unit;
    format!("{}.{:0>width$}", whole, frac.to_string(), width = precision)
}
