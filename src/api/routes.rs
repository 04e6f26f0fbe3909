//! API Route Configuration

use axum::{middleware, routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::logging_middleware;

/// Create the router: JSON endpoints plus the static page from `public_dir`
pub fn create_router(state: Arc<AppState>, public_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/tokens", get(handlers::list_tokens))
        .route("/status", get(handlers::status));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health_check))
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(logging_middleware)),
        )
}
