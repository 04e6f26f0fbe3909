//! API Request Handlers

use axum::extract::{Json, State};
use std::sync::Arc;
use std::time::Instant;

use super::types::*;
use crate::models::WatchedToken;
use crate::utils::constants::APP_VERSION;

/// Shared application state
pub struct AppState {
    pub tokens: Arc<[WatchedToken]>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(tokens: Arc<[WatchedToken]>) -> Self {
        Self {
            tokens,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Watch-list
// ============================================

pub async fn list_tokens(State(state): State<Arc<AppState>>) -> Json<TokenListResponse> {
    Json(TokenListResponse {
        tokens: state.tokens.iter().map(TokenView::from).collect(),
    })
}

// ============================================
// Status & Health
// ============================================

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        watched_tokens: state.tokens.len(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}
