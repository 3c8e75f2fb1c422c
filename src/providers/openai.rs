use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Client for OpenAI-compatible chat completion endpoints
///
/// Zhipu GLM, Qwen (DashScope compatible mode) and OpenAI all accept the same
/// `POST {endpoint}/chat/completions` request with a bearer key.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base endpoint, e.g. `https://open.bigmodel.cn/api/paas/v4`
    endpoint: String,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// A completion choice
#[derive(Debug, Deserialize, Clone)]
pub struct Choice {
    pub message: ChatMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl From<CompletionRequest> for ChatCompletionRequest {
    fn from(request: CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt,
        });
        Self {
            model: request.model,
            messages,
            temperature: Some(request.temperature),
            stream: false,
        }
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Client for the provider, key and endpoint in the translation config
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.api_key.clone(), config.get_endpoint(), config.timeout_secs)
    }

    /// URL of the chat completions resource under the configured endpoint
    pub fn completions_url(&self) -> Result<Url, ProviderError> {
        let base = format!("{}/", self.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|url| url.join("chat/completions"))
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", self.endpoint, e)))
    }

    /// Map a non-success status to the matching provider error
    fn status_error(status: StatusCode, message: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = CompletionRequest;
    type Response = ChatCompletionResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let url = self.completions_url()?;
        let body = ChatCompletionRequest::from(request);

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Chat completion API error ({}): {}", status, error_text);
            return Err(Self::status_error(status, error_text));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        if let Some(usage) = &completion.usage {
            debug!(
                "Chat completion used {} prompt + {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(completion)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        // The models listing needs no tokens and works on all compatible endpoints
        let url = self
            .completions_url()?
            .join("../models")
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(Self::status_error(status, error_text))
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }

    fn token_usage(response: &Self::Response) -> Option<(u64, u64)> {
        response.usage.as_ref().map(|u| (u.prompt_tokens, u.completion_tokens))
    }
}
