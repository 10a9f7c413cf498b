use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("{provider} request failed: {message}")]
    RemoteCall {
        provider: &'static str,
        message: String,
    },

    #[error("History has no user message to search for")]
    NoUserMessage,

    #[error("Pipeline finished without an assistant reply")]
    MissingReply,

    #[error("Stage {stage} removed or edited earlier history")]
    HistoryRewritten { stage: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn missing_credential(var: impl Into<String>) -> Self {
        Self::MissingCredential { var: var.into() }
    }

    #[must_use]
    pub fn remote(provider: &'static str, message: impl std::fmt::Display) -> Self {
        Self::RemoteCall {
            provider,
            message: message.to_string(),
        }
    }

    /// Whether the error came from a language-model or search call.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteCall { .. })
    }
}
