//! In-memory session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{History, Result, SessionStore};

/// Process-wide map from user identifier to history. Lost on exit.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, History>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored history.
    pub async fn user_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.sessions.read().await.contains_key(user_id)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, user_id: &str) -> Result<History> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(user_id).cloned().unwrap_or_default())
    }

    async fn replace(&self, user_id: &str, history: History) -> Result<()> {
        debug!(user_id, messages = history.len(), "Replacing stored history");
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), history);
        Ok(())
    }
}
