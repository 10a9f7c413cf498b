//! Web search through the Brave Search API.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use palaver_core::{Error, Result, SearchProvider};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::info;

const PROVIDER: &str = "brave-search";
const BRAVE_WEB_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

pub struct BraveSearchProvider {
    client: Client,
    api_key: String,
    result_count: u8,
}

impl BraveSearchProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating BraveSearchProvider");
        Self {
            client: Client::new(),
            api_key,
            result_count: 5,
        }
    }

    /// Number of hits requested per query, clamped to the API's 1..=20.
    #[must_use]
    pub fn with_result_count(mut self, count: u8) -> Self {
        self.result_count = count.clamp(1, 20);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote(PROVIDER, format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let count = self.result_count.to_string();
        Url::parse_with_params(
            BRAVE_WEB_SEARCH_URL,
            &[("q", query), ("count", count.as_str())],
        )
        .map_err(|e| Error::remote(PROVIDER, format!("invalid search URL: {e}")))
    }
}

// -- Brave API response types (only what we need) --

#[derive(Debug, Deserialize)]
struct BraveApiResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

/// Render hits as a numbered plain-text block for the model's context.
fn format_results(response: BraveApiResponse) -> String {
    let results = response.web.map(|w| w.results).unwrap_or_default();
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}. {}\n   {}", i + 1, result.title, result.url);
        if !result.description.is_empty() {
            let _ = write!(out, "\n   {}", result.description);
        }
    }
    out
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(&self, query: &str) -> Result<String> {
        let url = self.search_url(query)?;
        info!("Sending web search request: query_len={}", query.len());

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::remote(PROVIDER, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::remote(PROVIDER, "rate limited"));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            return Err(Error::remote(PROVIDER, format!("HTTP {status}: {body}")));
        }

        let api_response: BraveApiResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(PROVIDER, format!("invalid response: {e}")))?;

        info!("Received web search response");
        Ok(format_results(api_response))
    }
}
