//! Providers Module - External Services
//!
//! Etherscan as the transfer source, Telegram as the alert channel.

pub mod etherscan;
pub mod telegram;
pub mod traits;

pub use etherscan::*;
pub use telegram::*;
pub use traits::*;
