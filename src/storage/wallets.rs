//! Wallets keyed by chat id

use async_trait::async_trait;
use dashmap::DashMap;

use crate::wallet::Wallet;

/// Factory used by [`WalletStore::get_or_insert_with`].
pub type WalletFactory = Box<dyn FnOnce() -> Wallet + Send>;

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Option<Wallet>;

    /// Returns the chat's wallet, creating it with `create` if absent.
    ///
    /// Atomic: concurrent callers for one chat all get the same wallet.
    async fn get_or_insert_with(&self, chat_id: i64, create: WalletFactory) -> Wallet;
}

/// Process-lifetime wallets. Never evicted.
#[derive(Default)]
pub struct MemoryWalletStore {
    wallets: DashMap<i64, Wallet>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn get(&self, chat_id: i64) -> Option<Wallet> {
        self.wallets.get(&chat_id).map(|entry| entry.value().clone())
    }

    async fn get_or_insert_with(&self, chat_id: i64, create: WalletFactory) -> Wallet {
        let entry = self.wallets.entry(chat_id).or_insert_with(|| {
            log::info!("Creating wallet for chat {}", chat_id);
            create()
        });
        entry.value().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_or_insert_is_idempotent() {
        let store = MemoryWalletStore::new();
        assert!(store.get(1).await.is_none());

        let first = store.get_or_insert_with(1, Box::new(Wallet::generate)).await;
        let second = store.get_or_insert_with(1, Box::new(Wallet::generate)).await;
        assert_eq!(first.address(), second.address());
        assert_eq!(store.get(1).await.unwrap().address(), first.address());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_one_wallet() {
        let store = Arc::new(MemoryWalletStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.get_or_insert_with(42, Box::new(Wallet::generate)).await.address()
            }));
        }

        let mut addresses = Vec::new();
        for handle in handles {
            addresses.push(handle.await.unwrap());
        }
        addresses.dedup();
        assert_eq!(addresses.len(), 1);
        assert_eq!(store.len(), 1);
    }
}
