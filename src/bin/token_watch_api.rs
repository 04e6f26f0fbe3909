//! Token Watch status API server
//!
//! Serves the watch-list as JSON plus a small static page.
//!
//! Usage:
//!   cargo run --bin token_watch_api
//!
//! Environment:
//!   PORT       - Server port (default: 3000)
//!   PUBLIC_DIR - Static files directory (default: ./public)
//!   RUST_LOG   - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use token_watch::api::{create_router, AppState};
use token_watch::models::{api_port, load_watch_list};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let tokens = load_watch_list()?;
    let state = Arc::new(AppState::new(tokens));

    let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string());
    let app = create_router(state, &public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], api_port()?));

    info!("🌐 Web server running on http://{}", addr);
    info!("  GET /api/tokens  - Watch-list");
    info!("  GET /api/status  - Liveness");
    info!("  GET /health      - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 Web server shutdown complete");
    Ok(())
}
