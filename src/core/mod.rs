//! Core Module - Polling Orchestrator
//!
//! Drives the periodic, concurrent deposit checks over the watch-list.

pub mod monitor;

pub use monitor::*;
