#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod history;
pub mod store;

pub use error::{Error, Result};
pub use history::History;
pub use store::InMemorySessionStore;

/// Default system prompt sent ahead of the history on every model request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Web search output injected into the conversation.
    #[serde(rename = "search-result")]
    SearchResult,
}

impl Role {
    /// Role name understood by chat-completion APIs.
    ///
    /// Search results are folded into the context as user-authored notes.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::User | Self::SearchResult => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A single role-tagged message. Fields are private so a message cannot be
/// edited once it is part of a history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn search_result(content: impl Into<String>) -> Self {
        Self::new(Role::SearchResult, content)
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<LLMResponse>;
}

/// Free-text web search returning a provider-formatted block of results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Per-user conversation state.
///
/// `get_or_create` never mutates the store; `replace` overwrites the whole
/// history for a user, so callers pass the previous messages back in.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_or_create(&self, user_id: &str) -> Result<History>;
    async fn replace(&self, user_id: &str, history: History) -> Result<()>;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> LLMProvider for Arc<T> {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<LLMResponse> {
        (**self).chat(messages, model).await
    }
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Arc<T> {
    async fn search(&self, query: &str) -> Result<String> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_or_create(&self, user_id: &str) -> Result<History> {
        (**self).get_or_create(user_id).await
    }

    async fn replace(&self, user_id: &str, history: History) -> Result<()> {
        (**self).replace(user_id, history).await
    }
}
