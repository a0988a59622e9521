//! OpenAI provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use focus_protocols::{is_usable_api_key, CompletionBackend, ProviderError};
use tracing::{debug, warn};

use crate::api::{ApiRequest, ApiResponse};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-5-nano";
const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI chat completions backend.
pub struct OpenAIProvider {
    api_key: Option<String>,
    api_url: String,
    model: String,
    max_completion_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create provider with custom API URL (for OpenAI-compatible APIs).
    pub fn with_url(api_key: Option<String>, api_url: String) -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self {
            api_key,
            api_url,
            model: DEFAULT_MODEL.to_string(),
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            timeout,
            client: build_client(timeout),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing api key".to_string()))?;

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout.as_secs())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationFailed(text));
        }
        Err(ProviderError::ApiError {
            status: status.as_u16(),
            message: text,
        })
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

#[async_trait]
impl CompletionBackend for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        is_usable_api_key(self.api_key.as_deref())
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_request =
            ApiRequest::single_turn(&self.model, prompt, self.max_completion_tokens);
        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        debug!(
            "Completion from {} ({} tokens)",
            api_response.model,
            api_response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0)
        );
        api_response
            .first_text()
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
