//! Token Watch - ERC-20 deposit watcher
//!
//! Polls Etherscan for transfers into each watched token address and posts
//! every new deposit to Telegram.
//!
//! Environment:
//!   ETHERSCAN_API_KEY, TELEGRAM_BOT_TOKEN, CHAT_ID - credentials
//!   CARROT_TOKEN_ADDRESS, PUFFER_TOKEN_ADDRESS, PUFETH_TOKEN_ADDRESS
//!   POLLING_INTERVAL, MAX_RETRIES, RETRY_DELAY, MAX_RECONNECT_ATTEMPTS
//!   NODE_ENV=analysis - start without the polling loop

use std::sync::Arc;
use token_watch::utils::constants::{APP_NAME, APP_VERSION};
use token_watch::{EtherscanClient, MonitorConfig, RunMode, TelegramNotifier, TokenMonitor};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("🚀 {} v{} starting", APP_NAME, APP_VERSION);
    let config = MonitorConfig::from_env()?;

    let explorer = Arc::new(EtherscanClient::new(&config.explorer)?);
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram, config.tokens.clone())?);

    let monitor = Arc::new(TokenMonitor::new(
        config.mode,
        config.polling_interval,
        config.tokens.clone(),
        explorer.clone(),
        notifier.clone(),
    ));

    let listener = (config.mode == RunMode::Full).then(|| notifier.spawn_command_listener());

    let Some(handle) = monitor.start().await else {
        info!("No polling loop in {} mode, exiting", config.mode.as_str());
        return Ok(());
    };

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down gracefully...");
    monitor.stop();
    if let Some(listener) = listener {
        listener.abort();
    }
    handle.await?;

    let stats = monitor.get_stats();
    info!("📊 Final Statistics:");
    info!("   Cycles:          {}", stats.cycles_completed);
    info!("   Alerts sent:     {}", stats.alerts_sent);
    info!("   Alerts failed:   {}", stats.alerts_failed);
    info!("   Check failures:  {}", stats.check_failures);
    info!("   Seen txs:        {}", explorer.processed_count());

    Ok(())
}
