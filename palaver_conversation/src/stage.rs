//! Pipeline stages. Each takes the working history and returns it extended.

use std::fmt;

use async_trait::async_trait;
use palaver_core::{
    ChatMessage, DEFAULT_SYSTEM_PROMPT, Error, History, LLMProvider, Result, SearchProvider,
};
use tracing::{debug, info};

/// Prefix of the synthetic message carrying search results.
pub const SEARCH_RESULTS_LABEL: &str = "Search results:\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Search,
    Generate,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => f.write_str("SEARCH"),
            Self::Generate => f.write_str("GENERATE"),
        }
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;
    async fn run(&self, history: History) -> Result<History>;
}

/// Searches the web for the latest user message and appends the results.
///
/// Only that one message is used as the query; earlier turns are ignored.
pub struct SearchStage<S> {
    provider: S,
}

impl<S: SearchProvider> SearchStage<S> {
    pub const fn new(provider: S) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<S: SearchProvider> Stage for SearchStage<S> {
    fn kind(&self) -> StageKind {
        StageKind::Search
    }

    async fn run(&self, history: History) -> Result<History> {
        let query = history
            .last_user_message()
            .ok_or(Error::NoUserMessage)?
            .content()
            .to_string();

        let results = self.provider.search(&query).await?;
        debug!("Search returned {} chars", results.len());

        Ok(history.with_message(ChatMessage::search_result(format!(
            "{SEARCH_RESULTS_LABEL}{results}"
        ))))
    }
}

/// Model settings for the generate stage.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model to use for completions
    pub model: String,
    /// Prepended to each request; never stored in the history
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }
}

/// Sends the whole working history to the language model and appends the
/// assistant's reply.
pub struct GenerateStage<P> {
    provider: P,
    config: GenerationConfig,
}

impl<P: LLMProvider> GenerateStage<P> {
    pub const fn new(provider: P, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    fn build_messages(&self, history: &History) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = self.config.system_prompt.as_deref() {
            messages.push(ChatMessage::system(prompt));
        }
        messages.extend(history.messages().iter().cloned());
        messages
    }
}

#[async_trait]
impl<P: LLMProvider> Stage for GenerateStage<P> {
    fn kind(&self) -> StageKind {
        StageKind::Generate
    }

    async fn run(&self, history: History) -> Result<History> {
        let messages = self.build_messages(&history);
        info!(
            "Generating reply: model={}, context_messages={}",
            self.config.model,
            messages.len()
        );

        let response = self.provider.chat(&messages, &self.config.model).await?;

        if response.content.trim().is_empty() {
            return Err(Error::remote("language model", "empty response"));
        }

        Ok(history.with_message(ChatMessage::assistant(response.content)))
    }
}
