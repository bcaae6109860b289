//! Per-chat serialization of update handling.
//!
//! Updates for one chat run one at a time so a registration session is never
//! read and written by two handlers at once. Different chats do not contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<i64, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct ChatLocks {
    locks: Arc<LockMap>,
}

/// Held while a chat's update is being processed. Releasing the last guard
/// for a chat drops its lock entry.
pub struct ChatGuard {
    chat_id: i64,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other update for `chat_id` is in flight.
    pub async fn lock(&self, chat_id: i64) -> ChatGuard {
        let mutex = Arc::clone(self.locks.entry(chat_id).or_default().value());
        let guard = mutex.lock_owned().await;
        ChatGuard {
            chat_id,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of chats with a lock entry (held or awaited).
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for ChatGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Map holds the only reference once nobody waits on this chat.
        self.locks
            .remove_if(&self.chat_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
