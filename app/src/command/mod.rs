//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input type, so
//! dispatch in `main` is resolved at compile time.

use std::sync::Arc;
use std::time::Duration;

use palaver_config::{Config, Credentials};
use palaver_conversation::{DialogueManager, GenerationConfig, Pipeline};
use palaver_core::{InMemorySessionStore, SessionStore};
use palaver_providers::{BraveSearchProvider, OpenAiProvider};
use tracing::info;

mod chat;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Wire the providers, store and pipeline described by `config`.
///
/// Search is part of the pipeline only when `config.search.enabled` is set;
/// `credentials` must then carry a search key.
fn build_dialogue_manager(
    config: &Config,
    credentials: Credentials,
    model_override: Option<String>,
) -> anyhow::Result<DialogueManager> {
    let mut provider = OpenAiProvider::new(credentials.openai_api_key)
        .with_base_url(config.model.base_url.clone())
        .with_temperature(config.model.temperature)
        .with_max_tokens(config.model.max_tokens);
    if let Some(secs) = config.model.request_timeout_secs {
        provider = provider.with_timeout(Duration::from_secs(secs))?;
    }

    let generation = GenerationConfig::default()
        .with_model(model_override.unwrap_or_else(|| config.model.name.clone()))
        .with_system_prompt(config.model.system_prompt.clone());
    info!("Using model: {}", generation.model);

    let pipeline = match credentials.search_api_key {
        Some(search_key) if config.search.enabled => {
            let mut search =
                BraveSearchProvider::new(search_key).with_result_count(config.search.result_count);
            if let Some(secs) = config.search.request_timeout_secs {
                search = search.with_timeout(Duration::from_secs(secs))?;
            }
            info!("Web search enabled");
            Pipeline::retrieval_augmented(search, provider, generation)
        }
        _ => Pipeline::direct(provider, generation),
    };

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    Ok(DialogueManager::new(store, pipeline))
}
