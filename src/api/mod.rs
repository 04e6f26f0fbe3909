//! Watch-list status API
//! Read-only HTTP surface: token list, liveness and a static page

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
