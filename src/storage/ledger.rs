//! Processed update ids (webhook deduplication)

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

/// Remembers which update ids were already acted upon.
#[async_trait]
pub trait UpdateLedger: Send + Sync {
    async fn already_processed(&self, update_id: i64) -> bool;

    async fn mark_processed(&self, update_id: i64);

    /// Atomically records `update_id`.
    ///
    /// Returns `true` for exactly one caller per id; concurrent deliveries of
    /// the same update cannot both observe `true`.
    async fn mark_if_new(&self, update_id: i64) -> bool;
}

/// Bounded in-memory ledger: ids expire after `ttl` and at most
/// `max_entries` are kept.
#[derive(Clone)]
pub struct MemoryUpdateLedger {
    seen: Cache<i64, ()>,
}

impl MemoryUpdateLedger {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            seen: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl UpdateLedger for MemoryUpdateLedger {
    async fn already_processed(&self, update_id: i64) -> bool {
        self.seen.contains_key(&update_id)
    }

    async fn mark_processed(&self, update_id: i64) {
        self.seen.insert(update_id, ()).await;
    }

    async fn mark_if_new(&self, update_id: i64) -> bool {
        self.seen.entry(update_id).or_insert(()).await.is_fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ledger() -> MemoryUpdateLedger {
        MemoryUpdateLedger::new(Duration::from_secs(60), 1000)
    }

    #[tokio::test]
    async fn test_mark_then_check() {
        let ledger = ledger();
        assert!(!ledger.already_processed(10).await);
        ledger.mark_processed(10).await;
        assert!(ledger.already_processed(10).await);
        assert!(!ledger.already_processed(11).await);
    }

    #[tokio::test]
    async fn test_mark_if_new_only_once() {
        let ledger = ledger();
        assert!(ledger.mark_if_new(5).await);
        assert!(!ledger.mark_if_new(5).await);
        assert!(ledger.already_processed(5).await);
    }

    #[tokio::test]
    async fn test_concurrent_mark_if_new_has_single_winner() {
        let ledger = Arc::new(ledger());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move { ledger.mark_if_new(77).await }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let ledger = MemoryUpdateLedger::new(Duration::from_millis(50), 1000);
        assert!(ledger.mark_if_new(1).await);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!ledger.already_processed(1).await);
        assert!(ledger.mark_if_new(1).await);
    }
}
