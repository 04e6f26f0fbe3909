//! API Request/Response Types

use serde::Serialize;

use crate::models::WatchedToken;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

// ============================================
// Watch-list
// ============================================

/// Public view of a watched token (decimals stay internal)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenView {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub emoji: String,
}

impl From<&WatchedToken> for TokenView {
    fn from(token: &WatchedToken) -> Self {
        Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            emoji: token.emoji.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub tokens: Vec<TokenView>,
}

// ============================================
// Status & Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub watched_tokens: usize,
}
