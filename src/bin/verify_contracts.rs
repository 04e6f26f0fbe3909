//! Checks that every watched token address holds contract bytecode.
//!
//! Usage:
//!   cargo run --bin verify_contracts

use token_watch::models::{load_watch_list, ExplorerConfig};
use token_watch::utils::constants::DEFAULT_ETHERSCAN_BASE_URL;
use token_watch::EtherscanClient;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let api_key = std::env::var("ETHERSCAN_API_KEY")
        .map_err(|_| eyre::eyre!("ETHERSCAN_API_KEY not set"))?;
    let base_url = std::env::var("ETHERSCAN_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_ETHERSCAN_BASE_URL.to_string());

    let client = EtherscanClient::new(&ExplorerConfig::new(base_url, api_key))?;
    let tokens = load_watch_list()?;

    let mut missing = 0;
    for token in tokens.iter() {
        info!("🔍 Verifying {} at {}...", token.symbol, token.address);
        match client.verify_contract(&token.address).await {
            Ok(true) => info!("✓ {} contract verified", token.symbol),
            Ok(false) => {
                missing += 1;
                error!("ERROR: {} contract not found", token.symbol);
            }
            Err(e) => {
                missing += 1;
                error!("ERROR: {} verification failed: {}", token.symbol, e);
            }
        }
    }

    if missing > 0 {
        return Err(eyre::eyre!("{} of {} contracts failed verification", missing, tokens.len()));
    }
    Ok(())
}
