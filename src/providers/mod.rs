/*!
 * Provider implementations for the translation service.
 *
 * - `openai`: OpenAI-compatible chat completions (Zhipu GLM, Qwen compatible mode, OpenAI)
 * - `mock`: scripted provider used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single-turn completion as the translator sees it
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// Optional system message
    pub system: Option<String>,
    /// The user prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            temperature: 0.3,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Common trait for all LLM providers
///
/// Implementations can be used interchangeably by the translator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;

    /// Prompt and completion token counts, when the provider reports them
    fn token_usage(_response: &Self::Response) -> Option<(u64, u64)> {
        None
    }
}

pub mod mock;
pub mod openai;
