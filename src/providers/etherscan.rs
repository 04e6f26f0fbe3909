//! Etherscan API Client
//!
//! Fetches ERC-20 transfer history (`module=account&action=tokentx`) for a
//! watched address. Two layers of resilience wrap every request:
//! - `RetryExecutor`: linear backoff while Etherscan answers with rate limits
//! - `ConnectionManager`: exponential backoff that re-runs the whole call
//!   after connectivity failures, up to a hard cap
//!
//! Each client owns its own deduplication scope.
//!
//! API: https://api.etherscan.io/api

use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::traits::TransferSource;
use crate::models::{AppError, AppResult, ErrorCode, ExplorerConfig, TransferRecord};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;
use crate::utils::dedup::TransactionDeduplicator;
use crate::utils::recovery::ConnectionManager;
use crate::utils::retry::RetryExecutor;

/// Service name used in reconnect logs
const SERVICE_NAME: &str = "Etherscan";

/// Etherscan response envelope
#[derive(Debug, Deserialize)]
pub struct EtherscanResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// Array of transfers on success, an error string otherwise
    #[serde(default)]
    pub result: Value,
}

/// A `tokentx` entry; Etherscan encodes every number as a decimal string
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub block_number: String,
    pub time_stamp: String,
}

impl TryFrom<EtherscanTransfer> for TransferRecord {
    type Error = AppError;

    fn try_from(raw: EtherscanTransfer) -> AppResult<Self> {
        let value = U256::from_str_radix(raw.value.trim(), 10).map_err(|_| {
            AppError::invalid_response(format!("Bad value {:?} in tx {}", raw.value, raw.hash))
        })?;
        let block_number = raw.block_number.trim().parse().map_err(|_| {
            AppError::invalid_response(format!(
                "Bad blockNumber {:?} in tx {}",
                raw.block_number, raw.hash
            ))
        })?;
        let timestamp = raw.time_stamp.trim().parse().map_err(|_| {
            AppError::invalid_response(format!(
                "Bad timeStamp {:?} in tx {}",
                raw.time_stamp, raw.hash
            ))
        })?;

        Ok(TransferRecord {
            hash: raw.hash,
            from: raw.from,
            to: raw.to,
            value,
            block_number,
            timestamp,
        })
    }
}

/// Turn a `tokentx` envelope into transfer records.
///
/// Etherscan reports rate limiting with HTTP 200 and a string `result`,
/// so that case is mapped back to a rate-limit error here.
pub fn parse_transfer_response(body: EtherscanResponse) -> AppResult<Vec<TransferRecord>> {
    match body.result {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                let raw: EtherscanTransfer = serde_json::from_value(item)?;
                TransferRecord::try_from(raw)
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        Value::String(reason) => {
            if reason.to_lowercase().contains("rate limit") {
                Err(AppError::rate_limited())
            } else if body.message.starts_with("No transactions found") {
                Ok(Vec::new())
            } else {
                Err(AppError::new(
                    ErrorCode::ExplorerError,
                    format!("{} ({})", reason, body.message),
                ))
            }
        }
        other => Err(AppError::invalid_response(format!(
            "Unexpected result type (status {}): {}",
            body.status, other
        ))),
    }
}

/// Etherscan client with rate-limit retry, connection recovery and dedup
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryExecutor,
    connection: ConnectionManager,
    processed: TransactionDeduplicator,
}

impl EtherscanClient {
    pub fn new(config: &ExplorerConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::Unknown, "Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            retry: RetryExecutor::new(config.retry),
            connection: ConnectionManager::new(config.recovery),
            processed: TransactionDeduplicator::new(),
        })
    }

    /// Reconnect state, exposed for status reporting
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Number of transactions already alerted on
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Fetch transfers of `token_address` involving `target_address`,
    /// from `start_block` to latest, newest first.
    ///
    /// Connectivity failures re-run the call (bounded by the connection
    /// manager's cap); anything else surfaces as `EXPLORER_ERROR`.
    pub async fn get_token_transfers(
        &self,
        token_address: &str,
        target_address: &str,
        start_block: u64,
    ) -> AppResult<Vec<TransferRecord>> {
        let params: Vec<(&str, String)> = vec![
            ("module", "account".to_string()),
            ("action", "tokentx".to_string()),
            ("contractaddress", token_address.to_string()),
            ("address", target_address.to_string()),
            ("startblock", start_block.to_string()),
            ("endblock", "latest".to_string()),
            ("sort", "desc".to_string()),
            ("apikey", self.api_key.clone()),
        ];

        let this = self;
        let query = params.as_slice();

        loop {
            let result = self
                .retry
                .execute_with_retry(move || this.fetch_transfers(query))
                .await;

            match result {
                Ok(records) => {
                    self.connection.reset();
                    debug!("📥 {} transfers for {}", records.len(), token_address);
                    return Ok(records);
                }
                Err(e) if e.is_connectivity() => {
                    if self.connection.handle_connection_error(&e, SERVICE_NAME).await {
                        continue;
                    }
                    return Err(AppError::explorer(&e.message));
                }
                Err(e) => return Err(AppError::explorer(&e.message)),
            }
        }
    }

    /// Single `tokentx` request, no retries
    async fn fetch_transfers(&self, params: &[(&str, String)]) -> AppResult<Vec<TransferRecord>> {
        let response = self.client.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited());
        }
        if !status.is_success() {
            return Err(AppError::http_error(status.as_u16()));
        }

        let body: EtherscanResponse = response.json().await?;
        parse_transfer_response(body)
    }

    /// Check that `address` holds contract bytecode (`eth_getCode` != "0x")
    pub async fn verify_contract(&self, address: &str) -> AppResult<bool> {
        let params: Vec<(&str, String)> = vec![
            ("module", "proxy".to_string()),
            ("action", "eth_getCode".to_string()),
            ("address", address.to_string()),
            ("tag", "latest".to_string()),
            ("apikey", self.api_key.clone()),
        ];

        let this = self;
        let query = params.as_slice();
        let code = self
            .retry
            .execute_with_retry(move || this.fetch_code(query))
            .await?;

        let has_code = !code.is_empty() && code != "0x";
        info!(
            "{} {} {}",
            if has_code { "✅" } else { "❌" },
            address,
            if has_code { "has contract code" } else { "has no contract code" }
        );
        Ok(has_code)
    }

    async fn fetch_code(&self, params: &[(&str, String)]) -> AppResult<String> {
        let response = self.client.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited());
        }
        if !status.is_success() {
            return Err(AppError::http_error(status.as_u16()));
        }

        let body: EtherscanResponse = response.json().await?;
        match body.result {
            Value::String(code) if code.starts_with("0x") => Ok(code),
            Value::String(reason) if reason.to_lowercase().contains("rate limit") => {
                Err(AppError::rate_limited())
            }
            other => Err(AppError::invalid_response(format!(
                "Unexpected eth_getCode result: {}",
                other
            ))),
        }
    }

    /// First sighting of `hash` in this client's scope
    pub fn is_new_transaction(&self, hash: &str) -> bool {
        self.processed.is_new_transaction(hash)
    }
}

#[async_trait]
impl TransferSource for EtherscanClient {
    async fn get_token_transfers(
        &self,
        token_address: &str,
        target_address: &str,
        start_block: u64,
    ) -> AppResult<Vec<TransferRecord>> {
        EtherscanClient::get_token_transfers(self, token_address, target_address, start_block).await
    }

    fn is_new_transaction(&self, hash: &str) -> bool {
        EtherscanClient::is_new_transaction(self, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> EtherscanResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_transfers() {
        let body = envelope(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "19000000",
                "timeStamp": "1705000000",
                "hash": "0xfeed",
                "from": "0x0000000000000000000000000000000000000001",
                "to": "0x4d1C297d39C5c1277964D0E3f8Aa901493664530",
                "value": "1500000000000000000",
                "tokenSymbol": "PUFFER"
            }]
        }));

        let records = parse_transfer_response(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hash, "0xfeed");
        assert_eq!(records[0].block_number, 19_000_000);
        assert_eq!(records[0].timestamp, 1_705_000_000);
        assert_eq!(records[0].value, U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_empty_results() {
        let body = envelope(json!({"status": "0", "message": "No transactions found", "result": []}));
        assert!(parse_transfer_response(body).unwrap().is_empty());

        let body = envelope(json!({"status": "0", "message": "No transactions found", "result": "No transactions found"}));
        assert!(parse_transfer_response(body).unwrap().is_empty());

        let body = envelope(json!({"status": "1", "message": "OK"}));
        assert!(parse_transfer_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rate_limit_body() {
        let body = envelope(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }));
        let err = parse_transfer_response(body).unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_parse_api_error_body() {
        let body = envelope(json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}));
        let err = parse_transfer_response(body).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExplorerError);
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_parse_malformed_record() {
        let body = envelope(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "abc",
                "timeStamp": "1",
                "hash": "0x1",
                "from": "0x1",
                "to": "0x2",
                "value": "1"
            }]
        }));
        let err = parse_transfer_response(body).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExplorerInvalidResponse);
    }
}
