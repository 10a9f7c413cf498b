//! Dialogue manager: the entry point for a conversation turn.

use std::collections::HashMap;
use std::sync::Arc;

use palaver_core::{ChatMessage, Error, History, Result, Role, SessionStore};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::pipeline::Pipeline;

/// Result of processing a conversation turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Correlates the log lines of one turn
    pub turn_id: Uuid,
    /// Assistant's response
    pub response: String,
    /// Messages added to the history by this turn
    pub appended: usize,
    /// History as persisted after the turn
    pub history: History,
}

/// Runs turns against per-user histories held in a [`SessionStore`].
///
/// The stored history is only replaced after every stage succeeded, so a
/// failed remote call leaves the user's conversation exactly as it was.
pub struct DialogueManager<S = Arc<dyn SessionStore>>
where
    S: Send + Sync,
{
    store: S,
    pipeline: Pipeline,
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S> DialogueManager<S>
where
    S: SessionStore + Send + Sync,
{
    pub fn new(store: S, pipeline: Pipeline) -> Self {
        info!("Creating dialogue manager: {pipeline:?}");
        Self {
            store,
            pipeline,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Send `message` as `user_id` and return the assistant's reply.
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<String> {
        Ok(self.process_turn(user_id, message).await?.response)
    }

    /// Process a single conversation turn.
    pub async fn process_turn(&self, user_id: &str, message: &str) -> Result<TurnResult> {
        let turn_id = Uuid::now_v7();
        let span = info_span!("turn", %turn_id, user_id);

        async {
            // Concurrent turns for one user would otherwise both read the
            // same history and the later replace would drop the other turn.
            let lock = self.user_lock(user_id).await;
            let _guard = lock.lock().await;

            let stored = self.store.get_or_create(user_id).await?;
            let before = stored.len();
            info!("Processing turn with {before} stored message(s)");

            let working = stored.with_message(ChatMessage::user(message));
            let working = self.pipeline.run(working).await?;

            let response = working
                .last()
                .filter(|m| m.role() == Role::Assistant)
                .map(|m| m.content().to_string())
                .ok_or(Error::MissingReply)?;
            let appended = working.len().saturating_sub(before);

            self.store.replace(user_id, working.clone()).await?;
            debug!("Turn completed: appended={appended}, total={}", working.len());

            Ok(TurnResult {
                turn_id,
                response,
                appended,
                history: working,
            })
        }
        .instrument(span)
        .await
    }

    /// The injected store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }
}
