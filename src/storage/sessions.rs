//! Registration sessions keyed by chat id

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::marketplace::RegistrationStep;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Option<RegistrationStep>;

    /// Inserts or overwrites the chat's session.
    async fn set(&self, chat_id: i64, step: RegistrationStep);

    /// Removes the session, returning it if one existed.
    async fn delete(&self, chat_id: i64) -> Option<RegistrationStep>;
}

/// In-memory sessions that expire after `idle` without activity.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Cache<i64, RegistrationStep>,
}

impl MemorySessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_idle(idle).build(),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, chat_id: i64) -> Option<RegistrationStep> {
        self.sessions.get(&chat_id).await
    }

    async fn set(&self, chat_id: i64, step: RegistrationStep) {
        self.sessions.insert(chat_id, step).await;
    }

    async fn delete(&self, chat_id: i64) -> Option<RegistrationStep> {
        self.sessions.remove(&chat_id).await
    }
}
