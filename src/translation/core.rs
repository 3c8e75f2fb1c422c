/*!
 * Core sentence translation.
 *
 * `Translator` sends one sentence at a time through a `Provider`, with the preceding sentences as
 * context. Answers that look suspicious (several lines, far too long for the source) are kept but
 * flagged for review. Failed requests are retried with exponential backoff; once the retry budget
 * is spent the sentence gets the untranslated marker and is flagged instead of failing the run.
 */

use log::{debug, error, warn};
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};

use super::prompts::TranslationPromptBuilder;
use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::{CompletionRequest, Provider};

/// Token usage statistics for tracking API consumption
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of provider requests, retries included
    pub requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Fold one sentence's usage into the totals
    pub fn record(&mut self, translation: &SentenceTranslation) {
        if let Some((prompt, completion)) = translation.usage {
            self.add_token_usage(Some(prompt), Some(completion));
        }
        self.requests += u64::from(translation.attempts);
        self.api_duration += translation.api_duration;
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed_minutes = self.start_time.elapsed().as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Requests: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Wall time: {:.2} minutes\n\
             Tokens per minute: {:.0}",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            elapsed_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Log entry captured during a translation batch
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: &str, message: impl Into<String>) -> Self {
        Self {
            level: level.to_string(),
            message: message.into(),
        }
    }
}

/// Why a sentence needs a human look
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewFlag {
    /// The answer spans several lines
    MultiLine,
    /// Translated characters per source word above the limit
    RatioExceeded { ratio: f64, limit: f64 },
    /// Every attempt failed; the untranslated marker was used
    Untranslated { reason: String },
}

impl fmt::Display for ReviewFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewFlag::MultiLine => write!(f, "response contains multiple lines"),
            ReviewFlag::RatioExceeded { ratio, limit } => {
                write!(f, "response is longer than expected (ratio {:.2} > {:.2})", ratio, limit)
            }
            ReviewFlag::Untranslated { reason } => write!(f, "translation failed: {}", reason),
        }
    }
}

/// Result of translating one sentence
#[derive(Debug, Clone)]
pub struct SentenceTranslation {
    /// Position of the sentence in the input
    pub index: usize,
    pub source: String,
    /// Translation, or the untranslated marker
    pub text: String,
    pub flags: Vec<ReviewFlag>,
    /// Provider requests made for this sentence
    pub attempts: u32,
    /// Prompt and completion tokens of the successful request
    pub usage: Option<(u64, u64)>,
    pub api_duration: Duration,
}

impl SentenceTranslation {
    pub fn needs_review(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn is_untranslated(&self) -> bool {
        self.flags.iter().any(|f| matches!(f, ReviewFlag::Untranslated { .. }))
    }
}

/// Collapse a multi-line answer so the sentence file keeps one line per sentence
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Translated characters per whitespace-separated source word
pub fn translation_ratio(source: &str, translation: &str) -> f64 {
    let words = source.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    translation.chars().count() as f64 / words as f64
}

/// Translates single sentences through a provider
#[derive(Debug)]
pub struct Translator<P> {
    provider: P,
    provider_name: String,
    model: String,
    temperature: f32,
    prompts: TranslationPromptBuilder,
    window_size: usize,
    retry_count: u32,
    retry_backoff_ms: u64,
    ratio_limit: f64,
    untranslated_marker: String,
}

impl<P> Translator<P>
where
    P: Provider<Request = CompletionRequest>,
{
    pub fn new(provider: P, config: &TranslationConfig) -> Self {
        Self {
            provider,
            provider_name: config.provider.display_name().to_string(),
            model: config.get_model(),
            temperature: config.temperature,
            prompts: TranslationPromptBuilder::new().with_persona(&config.persona),
            window_size: config.window_size,
            retry_count: config.retry_count,
            retry_backoff_ms: config.retry_backoff_ms,
            ratio_limit: config.ratio_limit,
            untranslated_marker: config.untranslated_marker.clone(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Empty statistics labelled with this translator's provider and model
    pub fn new_token_stats(&self) -> TokenUsageStats {
        TokenUsageStats::with_provider_info(self.provider_name.clone(), self.model.clone())
    }

    /// The sentences preceding `index` that are sent as context
    pub fn context_window<'a, S: AsRef<str>>(&self, sentences: &'a [S], index: usize) -> &'a [S] {
        let end = index.min(sentences.len());
        &sentences[end.saturating_sub(self.window_size)..end]
    }

    pub fn build_prompt<S: AsRef<str>>(&self, sentence: &str, context: &[S]) -> String {
        self.prompts.clone().with_context(context).build(sentence)
    }

    /// Checks applied to every successful answer
    pub fn review(&self, source: &str, translation: &str) -> Vec<ReviewFlag> {
        let mut flags = Vec::new();
        if translation.contains('\n') {
            flags.push(ReviewFlag::MultiLine);
        }
        let ratio = translation_ratio(source, translation);
        if ratio > self.ratio_limit {
            flags.push(ReviewFlag::RatioExceeded {
                ratio,
                limit: self.ratio_limit,
            });
        }
        flags
    }

    /// Translate sentence `index` with the given context; never fails
    pub async fn translate<S: AsRef<str>>(&self, index: usize, sentence: &str, context: &[S]) -> SentenceTranslation {
        let mut result = SentenceTranslation {
            index,
            source: sentence.to_string(),
            text: String::new(),
            flags: Vec::new(),
            attempts: 0,
            usage: None,
            api_duration: Duration::from_secs(0),
        };
        if sentence.trim().is_empty() {
            return result;
        }

        let prompt = self.build_prompt(sentence, context);
        debug!("Prompt for sentence {}: {}", index + 1, prompt);
        let max_attempts = self.retry_count + 1;

        loop {
            result.attempts += 1;
            let started = Instant::now();
            let outcome = self.request(index, &prompt).await;
            result.api_duration += started.elapsed();

            match outcome {
                Ok((text, usage)) => {
                    result.flags = self.review(sentence, &text);
                    for flag in &result.flags {
                        warn!("Sentence {}: {}. Please check: {}", index + 1, flag, text);
                    }
                    result.text = single_line(&text);
                    result.usage = usage;
                    return result;
                }
                Err(e) => {
                    if !e.is_retryable() || result.attempts >= max_attempts {
                        error!(
                            "Sentence {} left untranslated after {} attempt(s): {}",
                            index + 1,
                            result.attempts,
                            e
                        );
                        result.text = self.untranslated_marker.clone();
                        result.flags.push(ReviewFlag::Untranslated { reason: e.to_string() });
                        return result;
                    }
                    let backoff = self.backoff(result.attempts);
                    warn!(
                        "Sentence {} attempt {}/{} failed: {}. Retrying in {:?}",
                        index + 1,
                        result.attempts,
                        max_attempts,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn request(&self, index: usize, prompt: &str) -> Result<(String, Option<(u64, u64)>), TranslationError> {
        let request = CompletionRequest::new(self.model.clone(), prompt).temperature(self.temperature);
        let response = self.provider.complete(request).await?;
        let text = P::extract_text(&response).trim().to_string();
        if text.is_empty() {
            return Err(TranslationError::EmptyResponse(index + 1));
        }
        Ok((text, P::token_usage(&response)))
    }

    /// Exponential backoff for the given attempt with up to a quarter of jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.retry_backoff_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(16));
        let jitter = if base >= 4 { rand::rng().random_range(0..=base / 4) } else { 0 };
        Duration::from_millis(base + jitter)
    }
}
