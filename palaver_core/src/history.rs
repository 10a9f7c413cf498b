//! Ordered, append-only conversation history for one user.

use chrono::{DateTime, Utc};

use crate::{ChatMessage, Role};

/// The messages exchanged with one user, oldest first.
///
/// Messages can only be appended; nothing is removed or edited for the
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    messages: Vec<ChatMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl History {
    /// Create a new empty history.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Builder-style append, handy when threading a history through stages.
    #[must_use]
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.push(message);
        self
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The most recently appended user message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role() == Role::User)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
