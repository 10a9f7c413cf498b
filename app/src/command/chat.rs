//! Conversation command: one user identifier, one in-memory history.

use palaver_config::{Config, Credentials};
use tracing::info;

use super::build_dialogue_manager;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Whose history the turns belong to
    pub user_id: String,
    /// Force web search on, regardless of the config file
    pub search: bool,
    /// Optional model override
    pub model: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// Credentials are checked before anything is read from stdin, so a missing
/// key ends the process before the first prompt.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if input.search {
            config.search.enabled = true;
        }

        let credentials = Credentials::from_env(config.search.enabled)?;
        let manager = build_dialogue_manager(&config, credentials, input.model)?;

        info!("Starting conversation for user: {}", input.user_id);

        if let Some(msg) = input.message {
            let reply = manager.chat(&input.user_id, &msg).await?;
            println!("Bot: {reply}");
        } else {
            let stdin = std::io::stdin();
            manager
                .run_interactive(&input.user_id, stdin.lock(), std::io::stdout())
                .await?;
        }

        Ok(())
    }
}
