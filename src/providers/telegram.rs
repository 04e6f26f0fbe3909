//! Telegram Bot API notifier
//!
//! Sends deposit alerts and plain messages to one chat, and answers the
//! `/status`, `/tokens` and `/help` commands through `getUpdates` long polling.
//!
//! API: https://api.telegram.org/bot<token>/<method>

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::traits::Notifier;
use crate::models::{AppError, AppResult, TelegramConfig, TransferRecord, WatchedToken};
use crate::utils::constants::{format_token_amount, ETHERSCAN_TX_URL, TELEGRAM_LONG_POLL_SECS};

/// Sent once when the poller enters Running
pub const STARTUP_MESSAGE: &str = "🤖 Token Monitor Bot Started";

const HELP_TEXT: &str = "/status - bot status\n/tokens - list tokens\n/help - help";

/// Generic Bot API envelope
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub text: Option<String>,
}

/// Chat commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Status,
    Tokens,
    Help,
}

impl BotCommand {
    const ALL: [BotCommand; 3] = [Self::Status, Self::Tokens, Self::Help];

    fn trigger(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::Tokens => "/tokens",
            Self::Help => "/help",
        }
    }

    /// Every command mentioned in the message text, each answered once
    /// (`/tokens@MyBot` works too)
    pub fn parse(text: &str) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|command| text.contains(command.trigger()))
            .collect()
    }
}

/// Render the deposit alert body
pub fn format_deposit_alert(token: &WatchedToken, tx: &TransferRecord) -> String {
    let timestamp = i64::try_from(tx.timestamp)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| tx.timestamp.to_string());

    format!(
        "{emoji} {symbol} DEPOSIT ALERT {emoji}\n\n\
         Amount: {amount} {symbol}\n\
         From: {from}\n\
         To: {to}\n\
         Transaction: {tx_url}{hash}\n\
         Block: {block}\n\
         Timestamp: {timestamp}",
        emoji = token.emoji,
        symbol = token.symbol,
        amount = format_token_amount(tx.value, token.decimals),
        from = tx.from,
        to = tx.to,
        tx_url = ETHERSCAN_TX_URL,
        hash = tx.hash,
        block = tx.block_number,
        timestamp = timestamp,
    )
}

/// `/tokens` reply
pub fn format_token_list(tokens: &[WatchedToken]) -> String {
    let lines: Vec<String> = tokens
        .iter()
        .map(|t| format!("{} - {}", t.symbol, t.address))
        .collect();
    format!("Monitored tokens:\n{}", lines.join("\n"))
}

/// Telegram notifier bound to a single chat
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
    tokens: Arc<[WatchedToken]>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, tokens: Arc<[WatchedToken]>) -> AppResult<Self> {
        // Long polling holds the request open, so the timeout must outlast it
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout + Duration::from_secs(TELEGRAM_LONG_POLL_SECS))
            .build()
            .map_err(|e| AppError::notifier(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            tokens,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn post_message(&self, text: &str) -> AppResult<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| AppError::notifier(format!("sendMessage failed: {}", e)))?;

        let status = response.status();
        let body: TelegramResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::notifier(format!("Bad sendMessage response: {}", e)))?;

        if !body.ok {
            return Err(AppError::notifier(format!(
                "sendMessage rejected ({}): {}",
                status,
                body.description.unwrap_or_default()
            ))
            .with_status(status.as_u16()));
        }
        Ok(())
    }

    /// Fetch pending updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> AppResult<Vec<Update>> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", TELEGRAM_LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::notifier(format!("getUpdates failed: {}", e)))?;

        let body: TelegramResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| AppError::notifier(format!("Bad getUpdates response: {}", e)))?;

        if !body.ok {
            return Err(AppError::notifier(format!(
                "getUpdates rejected: {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(body.result.unwrap_or_default())
    }

    /// Reply text for a command
    pub fn command_reply(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Status => "Bot is running".to_string(),
            BotCommand::Tokens => format_token_list(&self.tokens),
            BotCommand::Help => HELP_TEXT.to_string(),
        }
    }

    /// Answer one batch of updates; returns the next offset
    pub async fn handle_updates(&self, updates: &[Update], offset: i64) -> i64 {
        let mut next = offset;
        for update in updates {
            next = next.max(update.update_id + 1);

            let text = update.message.as_ref().and_then(|m| m.text.as_deref());
            for command in text.map(BotCommand::parse).unwrap_or_default() {
                debug!("💬 Command received: {:?}", command);
                if let Err(e) = self.post_message(&self.command_reply(command)).await {
                    warn!("⚠️ Failed to answer {:?}: {}", command, e);
                }
            }
        }
        next
    }

    /// Spawn the long-polling command loop
    pub fn spawn_command_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let notifier = self.clone();
        tokio::spawn(async move {
            info!("💬 Telegram command listener started");
            let mut offset = 0;
            loop {
                match notifier.get_updates(offset).await {
                    Ok(updates) => offset = notifier.handle_updates(&updates, offset).await,
                    Err(e) => {
                        warn!("⚠️ Telegram polling error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_deposit_alert(&self, token: &WatchedToken, transaction: &TransferRecord) -> AppResult<()> {
        info!("🚨 {} deposit {} -> sending alert", token.symbol, transaction.hash);
        self.post_message(&format_deposit_alert(token, transaction)).await
    }

    async fn send_message(&self, text: &str) -> AppResult<()> {
        self.post_message(text).await
    }
}
