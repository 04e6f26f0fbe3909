//! Utils Module - Helper Functions & Shared Utilities
//!
//! Resilience primitives used by the explorer client, plus the shared
//! constants table.

pub mod constants;
pub mod dedup;
pub mod recovery;
pub mod retry;

pub use constants::*;
pub use dedup::*;
pub use recovery::*;
pub use retry::*;
