//! Status API router tests (in-process, no socket)

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use token_watch::api::{create_router, AppState};
use token_watch::WatchedToken;
use tower::ServiceExt;

fn state() -> Arc<AppState> {
    let tokens = vec![
        WatchedToken::new(
            "0x282A69142bac47855C3fbE1693FCC4bA3B4d5eD6",
            "CARROT",
            "Carrot Token",
            18,
            "🥕",
        )
        .unwrap(),
        WatchedToken::new(
            "0x4d1C297d39C5c1277964D0E3f8Aa901493664530",
            "PUFFER",
            "Puffer Token",
            18,
            "🐡",
        )
        .unwrap(),
    ];
    Arc::new(AppState::new(tokens.into()))
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let app = create_router(state(), "public");
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_list_tokens() {
    let (status, body) = get_json("/api/tokens").await;
    assert_eq!(status, StatusCode::OK);

    let tokens = body["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0]["symbol"], "CARROT");
    assert_eq!(tokens[0]["emoji"], "🥕");
    assert_eq!(tokens[1]["address"], "0x4d1C297d39C5c1277964D0E3f8Aa901493664530");
    assert!(tokens[1].get("decimals").is_none());
}

#[tokio::test]
async fn test_status() {
    let (status, body) = get_json("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["watched_tokens"], 2);
}
