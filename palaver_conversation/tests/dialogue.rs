use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use palaver_conversation::{DialogueManager, GenerationConfig, Pipeline, SEARCH_RESULTS_LABEL};
use palaver_core::{
    ChatMessage, Error, History, InMemorySessionStore, LLMProvider, LLMResponse, Result, Role,
    SearchProvider, SessionStore,
};

/// Echoes the last message it was given and counts calls.
#[derive(Clone, Default)]
struct EchoModel {
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    fail: bool,
}

impl EchoModel {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LLMProvider for EchoModel {
    async fn chat(&self, messages: &[ChatMessage], _model: &str) -> Result<LLMResponse> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());
        if self.fail {
            return Err(Error::remote("echo", "connection reset"));
        }
        let last = messages.last().map_or("", ChatMessage::content);
        Ok(LLMResponse {
            content: format!("echo({}): {last}", messages.len()),
            usage: None,
        })
    }
}

#[derive(Clone, Default)]
struct WeatherSearch {
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SearchProvider for WeatherSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());
        Ok("1. Paris: 18C, light rain".to_string())
    }
}

fn no_system_prompt() -> GenerationConfig {
    GenerationConfig::default().with_system_prompt(None)
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn direct_dialogue_stores_two_messages_per_turn() {
    let store = Arc::new(InMemorySessionStore::new());
    let manager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::direct(EchoModel::default(), no_system_prompt()),
    );

    for n in 1..=5 {
        manager
            .chat("bob", &format!("message {n}"))
            .await
            .expect("Turn failed");

        let history = store.get_or_create("bob").await.expect("Load failed");
        assert_eq!(history.len(), 2 * n);
    }

    let history = store.get_or_create("bob").await.expect("Load failed");
    for (i, pair) in history.messages().chunks(2).enumerate() {
        assert_eq!(pair[0], ChatMessage::user(format!("message {}", i + 1)));
        assert_eq!(pair[1].role(), Role::Assistant);
    }
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn retrieval_scenario_matches_weather_walkthrough() {
    let store = Arc::new(InMemorySessionStore::new());
    let search = WeatherSearch::default();
    let model = EchoModel::default();
    let manager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::retrieval_augmented(search.clone(), model.clone(), no_system_prompt()),
    );

    let reply = manager
        .chat("alice", "What's the weather in Paris?")
        .await
        .expect("Turn failed");

    let queries = search
        .queries
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    assert_eq!(queries, vec!["What's the weather in Paris?".to_string()]);

    // The model was called with the user message plus the search results.
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(
        calls[0][1],
        ChatMessage::search_result(format!("{SEARCH_RESULTS_LABEL}1. Paris: 18C, light rain"))
    );

    let history = store.get_or_create("alice").await.expect("Load failed");
    let roles: Vec<Role> = history.messages().iter().map(ChatMessage::role).collect();
    assert_eq!(roles, vec![Role::User, Role::SearchResult, Role::Assistant]);
    assert_eq!(history.messages()[2].content(), reply);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn retrieval_turns_append_three_messages_each() {
    let store = Arc::new(InMemorySessionStore::new());
    let manager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::retrieval_augmented(
            WeatherSearch::default(),
            EchoModel::default(),
            no_system_prompt(),
        ),
    );

    for n in 1..=3 {
        manager.chat("alice", "again?").await.expect("Turn failed");
        let history = store.get_or_create("alice").await.expect("Load failed");
        assert_eq!(history.len(), 3 * n);
    }
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn users_never_see_each_others_history() {
    let store = Arc::new(InMemorySessionStore::new());
    let model = EchoModel::default();
    let manager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::direct(model.clone(), no_system_prompt()),
    );

    manager.chat("a", "secret of a").await.expect("Turn failed");
    let a_before: History = store.get_or_create("a").await.expect("Load failed");

    manager.chat("b", "hello from b").await.expect("Turn failed");

    let a_after = store.get_or_create("a").await.expect("Load failed");
    assert_eq!(a_after, a_before);

    // b's request contained only b's message.
    let calls = model.calls();
    assert_eq!(calls[1], vec![ChatMessage::user("hello from b")]);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn failed_generation_is_not_persisted() {
    let store = Arc::new(InMemorySessionStore::new());
    let seeded = History::new()
        .with_message(ChatMessage::user("earlier"))
        .with_message(ChatMessage::assistant("reply"));
    store
        .replace("carol", seeded.clone())
        .await
        .expect("Seed failed");

    let manager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::retrieval_augmented(
            WeatherSearch::default(),
            EchoModel::failing(),
            no_system_prompt(),
        ),
    );

    let err = manager.chat("carol", "will fail").await.err();

    assert!(matches!(err, Some(Error::RemoteCall { .. })));
    let after = store.get_or_create("carol").await.expect("Load failed");
    assert_eq!(after, seeded);
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn trait_object_store_can_be_injected() {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let manager: DialogueManager = DialogueManager::new(
        Arc::clone(&store),
        Pipeline::direct(EchoModel::default(), no_system_prompt()),
    );

    let reply = manager.chat("dave", "ping").await.expect("Turn failed");

    assert_eq!(reply, "echo(1): ping");
}
