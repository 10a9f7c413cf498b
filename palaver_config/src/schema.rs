use palaver_core::DEFAULT_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Language-model settings. The API key comes from the environment.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "ModelConfig::default_name")]
    pub name: String,
    #[serde(default = "ModelConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ModelConfig::default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sent ahead of the history on every request, never stored in it.
    #[serde(default = "ModelConfig::default_system_prompt")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            base_url: Self::default_base_url(),
            temperature: Self::default_temperature(),
            max_tokens: None,
            system_prompt: Self::default_system_prompt(),
            request_timeout_secs: None,
        }
    }
}

impl ModelConfig {
    fn default_name() -> String {
        "gpt-4o-mini".to_string()
    }

    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    #[allow(clippy::unnecessary_wraps)]
    const fn default_temperature() -> Option<f32> {
        Some(0.7)
    }

    #[allow(clippy::unnecessary_wraps)]
    fn default_system_prompt() -> Option<String> {
        Some(DEFAULT_SYSTEM_PROMPT.to_string())
    }
}

/// Web search settings for retrieval-augmented turns.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "SearchConfig::default_result_count")]
    pub result_count: u8,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            result_count: Self::default_result_count(),
            request_timeout_secs: None,
        }
    }
}

impl SearchConfig {
    const fn default_result_count() -> u8 {
        5
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("palaver"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/palaver/config.json`, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join("config.json");

        Self::write_default(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Export OPENAI_API_KEY with your OpenAI API key");
        println!("   2. Export BRAVE_SEARCH_API_KEY if you want web search (--search)");
        println!("   3. Run 'palaver <user_id>' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model.name: chat model to use (gpt-4o-mini, gpt-4o, ...)");
        println!("   - model.base_url: any OpenAI-compatible endpoint");
        println!("   - search.enabled: search the web before every reply");
        println!();
        Ok(())
    }

    /// Write the default config to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let content = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
