/*!
 * Mock provider for testing.
 *
 * The mock answers `CompletionRequest`s according to a `MockBehavior`:
 * - `MockProvider::working()` - answers with the initials of the sentence
 * - `MockProvider::intermittent(n)` - every n-th request fails with a 503
 * - `MockProvider::failing()` - every request fails
 * - `MockProvider::multi_line()` - answers with two lines
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
    /// Simulated prompt tokens
    pub prompt_tokens: u64,
    /// Simulated completion tokens
    pub completion_tokens: u64,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request with a retryable error
    Intermittent { fail_every: usize },
    /// Always fails with a retryable error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Returns an empty response
    Empty,
    /// Returns a translation spread over two lines
    MultiLine,
    /// Sleeps before answering
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn multi_line() -> Self {
        Self::new(MockBehavior::MultiLine)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The sentence to translate: the text after the last full-width colon of the prompt
    pub fn sentence_of(request: &CompletionRequest) -> &str {
        request
            .prompt
            .rsplit_once('：')
            .map_or(request.prompt.as_str(), |(_, sentence)| sentence)
            .trim()
    }

    /// First character of every word, a stand-in translation one character per word long
    pub fn initials(sentence: &str) -> String {
        sentence.split_whitespace().filter_map(|w| w.chars().next()).collect()
    }

    fn answer(&self, request: &CompletionRequest) -> MockResponse {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => Self::initials(Self::sentence_of(request)),
        };
        MockResponse {
            prompt_tokens: request.prompt.chars().count() as u64,
            completion_tokens: text.chars().count() as u64,
            text,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = CompletionRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(&request)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.answer(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::Empty => Ok(MockResponse {
                text: String::new(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),

            MockBehavior::MultiLine => {
                let mut response = self.answer(&request);
                response.text = format!("{}\n（补充说明）", response.text);
                Ok(response)
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.answer(&request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError("Simulated invalid API key".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }

    fn token_usage(response: &Self::Response) -> Option<(u64, u64)> {
        Some((response.prompt_tokens, response.completion_tokens))
    }
}
