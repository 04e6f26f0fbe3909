//! Transaction deduplication
//!
//! Remembers every transaction hash that already produced an alert.
//! Backed by a DashSet so concurrent token checks can share one instance
//! without an outer lock. Entries are never evicted: the set lives as long
//! as the process.

use dashmap::DashSet;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TransactionDeduplicator {
    /// Lowercase tx hashes already seen
    seen: DashSet<String>,
}

impl TransactionDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn normalize_hash(hash: &str) -> String {
        hash.to_lowercase()
    }

    /// `true` the first time a hash is offered, `false` ever after
    pub fn is_new_transaction(&self, hash: &str) -> bool {
        let inserted = self.seen.insert(Self::normalize_hash(hash));
        if !inserted {
            debug!("🔁 Already alerted: {}", hash);
        }
        inserted
    }

    /// Number of hashes recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
