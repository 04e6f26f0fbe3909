//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so log lines from the poller can be
//! grepped and alerted on.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - EXPLORER_xxx: Etherscan-related errors
//! - NOTIFIER_xxx: Telegram errors
//! - CFG_xxx: Configuration errors
//! - TOKEN_xxx: Watch-list errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status returned by the remote side, if any
    pub status: Option<u16>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach the HTTP status the remote side answered with
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Rate limit signal: explicit code or HTTP 429
    pub fn is_rate_limited(&self) -> bool {
        self.code == ErrorCode::ExplorerRateLimited || self.status == Some(429)
    }

    /// Transient connectivity failure that warrants re-running the whole call
    pub fn is_connectivity(&self) -> bool {
        match self.code {
            ErrorCode::ExplorerConnectionFailed | ErrorCode::ExplorerTimeout => true,
            // Rate limiting that outlived the retry executor is treated as a degraded link
            ErrorCode::ExplorerRateLimited => true,
            ErrorCode::ExplorerHttpError => matches!(self.status, Some(s) if s >= 500 || s == 429),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Explorer Errors
    // ============================================
    /// Explorer answered with HTTP 429 or a rate-limit body
    ExplorerRateLimited,
    /// Explorer connection failed (DNS, refused, reset)
    ExplorerConnectionFailed,
    /// Explorer request timeout
    ExplorerTimeout,
    /// Explorer returned a non-success HTTP status
    ExplorerHttpError,
    /// Explorer response could not be decoded
    ExplorerInvalidResponse,
    /// Explorer call failed permanently
    ExplorerError,

    // ============================================
    // Notifier Errors
    // ============================================
    /// Telegram API call failed
    NotifierError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Token Errors
    // ============================================
    /// Invalid token address
    TokenInvalidAddress,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplorerRateLimited => "EXPLORER_RATE_LIMITED",
            Self::ExplorerConnectionFailed => "EXPLORER_CONNECTION_FAILED",
            Self::ExplorerTimeout => "EXPLORER_TIMEOUT",
            Self::ExplorerHttpError => "EXPLORER_HTTP_ERROR",
            Self::ExplorerInvalidResponse => "EXPLORER_INVALID_RESPONSE",
            Self::ExplorerError => "EXPLORER_ERROR",

            Self::NotifierError => "NOTIFIER_ERROR",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::TokenInvalidAddress => "TOKEN_INVALID_ADDRESS",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Explorer rate limited
    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::ExplorerRateLimited, "Rate limited (HTTP 429)").with_status(429)
    }

    /// Explorer connection failed
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerConnectionFailed, msg)
    }

    /// Explorer timeout
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerTimeout, msg)
    }

    /// Non-success HTTP status
    pub fn http_error(status: u16) -> Self {
        Self::new(ErrorCode::ExplorerHttpError, format!("HTTP error: {}", status)).with_status(status)
    }

    /// Undecodable explorer response
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerInvalidResponse, msg)
    }

    /// Permanent explorer failure, wrapping the original message
    pub fn explorer(msg: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ExplorerError, format!("Etherscan API error: {}", msg))
    }

    /// Telegram failure
    pub fn notifier(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotifierError, msg)
    }

    /// Missing environment variable
    pub fn missing_env(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", key_name),
        )
    }

    /// Unparseable configuration value
    pub fn invalid_config(key_name: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key_name, value),
        )
    }

    /// Invalid token address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenInvalidAddress, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let mut mapped = if err.is_timeout() {
            Self::new(ErrorCode::ExplorerTimeout, "Request timeout")
        } else if err.is_connect() || err.is_request() {
            Self::new(ErrorCode::ExplorerConnectionFailed, format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::new(ErrorCode::ExplorerInvalidResponse, format!("Decode failed: {}", err))
        } else if status == Some(429) {
            Self::rate_limited()
        } else if status.is_some() {
            Self::new(ErrorCode::ExplorerHttpError, err.to_string())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        };
        mapped.status = mapped.status.or(status);
        mapped
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ExplorerInvalidResponse, "JSON parse error", err)
    }
}
