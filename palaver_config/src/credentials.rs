//! API keys read from the environment at startup.

use palaver_core::Error;
use tracing::debug;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BRAVE_SEARCH_API_KEY_VAR: &str = "BRAVE_SEARCH_API_KEY";

#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    /// Present only when web search is enabled.
    pub search_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn from_env(search_enabled: bool) -> Result<Self, Error> {
        Self::from_lookup(search_enabled, |var| std::env::var(var).ok())
    }

    /// Resolve keys through `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(search_enabled: bool, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::missing_credential(var))
        };

        let openai_api_key = require(OPENAI_API_KEY_VAR)?;
        let search_api_key = if search_enabled {
            Some(require(BRAVE_SEARCH_API_KEY_VAR)?)
        } else {
            None
        };

        debug!(search_enabled, "Loaded API credentials");
        Ok(Self {
            openai_api_key,
            search_api_key,
        })
    }
}
