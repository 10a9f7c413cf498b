//! In-process stand-ins for the remote model and search provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use palaver_core::{ChatMessage, Error, History, LLMProvider, LLMResponse, Result, SearchProvider};

use crate::stage::{Stage, StageKind};

/// Replies with canned answers in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    replies: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedModel {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies.into_iter().map(str::to_string).collect(),
            )),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedModel {
    async fn chat(&self, messages: &[ChatMessage], _model: &str) -> Result<LLMResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::remote("scripted model", "no replies left"))?;
        Ok(LLMResponse {
            content: reply,
            usage: None,
        })
    }
}

/// [`ScriptedModel`] that yields to the scheduler before answering, so other
/// tasks on the same runtime get to run mid-turn.
#[derive(Clone)]
pub struct YieldingModel(pub ScriptedModel);

#[async_trait]
impl LLMProvider for YieldingModel {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<LLMResponse> {
        tokio::task::yield_now().await;
        self.0.chat(messages, model).await
    }
}

/// Returns a fixed result block and records each query.
#[derive(Clone)]
pub struct RecordingSearch {
    results: String,
    queries: Arc<Mutex<Vec<String>>>,
}

impl RecordingSearch {
    pub fn new(results: &str) -> Self {
        Self {
            results: results.to_string(),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SearchProvider for RecordingSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());
        Ok(self.results.clone())
    }
}

pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str) -> Result<String> {
        Err(Error::remote("search", "HTTP 503"))
    }
}

/// Throws the history away and starts a fresh one.
pub struct ResetStage;

#[async_trait]
impl Stage for ResetStage {
    fn kind(&self) -> StageKind {
        StageKind::Search
    }

    async fn run(&self, _history: History) -> Result<History> {
        Ok(History::new().with_message(ChatMessage::assistant("fresh")))
    }
}
