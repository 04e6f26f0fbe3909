//! Etherscan client tests against a local mock server
//!
//! Run with: cargo test --test etherscan_test -- --nocapture

use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;
use token_watch::{ErrorCode, EtherscanClient, ExplorerConfig, RecoveryConfig, RetryConfig};

const PUFFER: &str = "0x4d1C297d39C5c1277964D0E3f8Aa901493664530";

/// Tiny delays so retry paths run instantly
fn test_config(base_url: String) -> ExplorerConfig {
    let mut config = ExplorerConfig::new(base_url, "test-key");
    config.http_timeout = Duration::from_secs(2);
    config.retry = RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    };
    config.recovery = RecoveryConfig {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };
    config
}

fn tokentx_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("module".into(), "account".into()),
        Matcher::UrlEncoded("action".into(), "tokentx".into()),
        Matcher::UrlEncoded("contractaddress".into(), PUFFER.into()),
        Matcher::UrlEncoded("address".into(), PUFFER.into()),
        Matcher::UrlEncoded("startblock".into(), "0".into()),
        Matcher::UrlEncoded("endblock".into(), "latest".into()),
        Matcher::UrlEncoded("sort".into(), "desc".into()),
        Matcher::UrlEncoded("apikey".into(), "test-key".into()),
    ])
}

fn transfer(hash: &str, to: &str, value: &str) -> serde_json::Value {
    json!({
        "blockNumber": "19000000",
        "timeStamp": "1705000000",
        "hash": hash,
        "from": "0x0000000000000000000000000000000000000001",
        "to": to,
        "value": value,
        "contractAddress": PUFFER.to_lowercase(),
        "tokenSymbol": "PUFFER",
        "tokenDecimal": "18"
    })
}

#[tokio::test]
async fn test_fetches_and_parses_transfers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api")
        .match_query(tokentx_query())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "1",
                "message": "OK",
                "result": [
                    transfer("0xaaa", &PUFFER.to_lowercase(), "1000000000000000000"),
                    transfer("0xbbb", "0x0000000000000000000000000000000000000002", "5")
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = EtherscanClient::new(&test_config(format!("{}/api", server.url()))).unwrap();
    let records = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hash, "0xaaa");
    assert_eq!(records[0].block_number, 19_000_000);
    assert_eq!(records[1].to, "0x0000000000000000000000000000000000000002");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_transactions_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"0","message":"No transactions found","result":[]}"#)
        .create_async()
        .await;

    let client = EtherscanClient::new(&test_config(format!("{}/api", server.url()))).unwrap();
    let records = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_rate_limit_exhaustion_becomes_explorer_error() {
    let mut server = Server::new_async().await;
    // 3 retry attempts per call; recovery allows 0 re-runs here
    let mock = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let mut config = test_config(format!("{}/api", server.url()));
    config.recovery.max_attempts = 0;
    let client = EtherscanClient::new(&config).unwrap();

    let err = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExplorerError);
    assert!(err.message.starts_with("Etherscan API error"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_body_is_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#)
        .expect(3)
        .create_async()
        .await;

    let mut config = test_config(format!("{}/api", server.url()));
    config.recovery.max_attempts = 0;
    let client = EtherscanClient::new(&config).unwrap();

    assert!(client.get_token_transfers(PUFFER, PUFFER, 0).await.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_rerun_whole_call_until_cap() {
    let mut server = Server::new_async().await;
    // first call + 2 recovery re-runs, no 429 retries
    let mock = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = EtherscanClient::new(&test_config(format!("{}/api", server.url()))).unwrap();
    let err = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExplorerError);
    assert_eq!(client.connection().attempts(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_success_after_server_errors_resets_recovery() {
    let mut server = Server::new_async().await;
    // Mocks are served in creation order until their expected hits are used up
    let failing = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;
    let healthy = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"1","message":"OK","result":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = test_config(format!("{}/api", server.url()));
    config.recovery.max_attempts = 5;
    let client = EtherscanClient::new(&config).unwrap();

    let records = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(client.connection().attempts(), 0);
    failing.assert_async().await;
    healthy.assert_async().await;
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = EtherscanClient::new(&test_config(format!("{}/api", server.url()))).unwrap();
    let err = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExplorerError);
    assert!(err.message.contains("Invalid API Key"));
    assert_eq!(client.connection().attempts(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_uses_recovery() {
    // Nothing listens on port 1
    let client = EtherscanClient::new(&test_config("http://127.0.0.1:1/api".to_string())).unwrap();
    let err = client.get_token_transfers(PUFFER, PUFFER, 0).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExplorerError);
    assert_eq!(client.connection().attempts(), 2);
}

#[tokio::test]
async fn test_deduplication_scope_per_client() {
    let config = test_config("http://127.0.0.1:1/api".to_string());
    let a = EtherscanClient::new(&config).unwrap();
    let b = EtherscanClient::new(&config).unwrap();

    assert!(a.is_new_transaction("0xaaa"));
    assert!(!a.is_new_transaction("0xaaa"));
    assert!(b.is_new_transaction("0xaaa"));
    assert_eq!(a.processed_count(), 1);
}

#[tokio::test]
async fn test_verify_contract() {
    let mut server = Server::new_async().await;
    let _with_code = server
        .mock("GET", "/api")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("module".into(), "proxy".into()),
            Matcher::UrlEncoded("action".into(), "eth_getCode".into()),
            Matcher::UrlEncoded("address".into(), PUFFER.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x6080604052"}"#)
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/api")
        .match_query(Matcher::UrlEncoded(
            "address".into(),
            "0x0000000000000000000000000000000000000009".into(),
        ))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x"}"#)
        .create_async()
        .await;

    let client = EtherscanClient::new(&test_config(format!("{}/api", server.url()))).unwrap();
    assert!(client.verify_contract(PUFFER).await.unwrap());
    assert!(!client
        .verify_contract("0x0000000000000000000000000000000000000009")
        .await
        .unwrap());
}
