use std::time::Duration;

use async_trait::async_trait;
use palaver_core::{ChatMessage, Error, LLMProvider, LLMResponse, Result, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info};

const PROVIDER: &str = "openai";

/// Chat-completions client for OpenAI and API-compatible endpoints.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the HTTP client with one that gives up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote(PROVIDER, format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn build_request(&self, messages: &[ChatMessage], model: &str) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role().wire_name(), "content": m.content() }))
            .collect();

        let mut request = json!({
            "model": model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            request["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request["max_tokens"] = json!(max_tokens);
        }
        request
    }

    async fn try_send(&self, request: &Value) -> reqwest::Result<Value> {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

fn parse_response(response: &Value) -> Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| Error::remote(PROVIDER, "invalid response format: missing content"))?
        .to_string();

    let token_count = |u: &serde_json::Map<String, Value>, key: &str| {
        u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
    };
    let usage = response["usage"].as_object().map(|u| Usage {
        prompt_tokens: token_count(u, "prompt_tokens"),
        completion_tokens: token_count(u, "completion_tokens"),
        total_tokens: token_count(u, "total_tokens"),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<LLMResponse> {
        let request = self.build_request(messages, model);

        info!(
            "Sending request to chat completions API: model={}, messages={}",
            model,
            messages.len()
        );

        let response = self
            .try_send(&request)
            .await
            .map_err(|e| Error::remote(PROVIDER, e))?;
        let response = parse_response(&response)?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from chat completions API");
        Ok(response)
    }
}
