/*!
 * Error types for the subator application.
 *
 * The splitting and alignment core reports failures through `SplitError`. Every variant
 * names the check that failed and carries enough location information (sentence index,
 * fragment text) for an operator to fix the offending input line by hand.
 */

use thiserror::Error;

/// Failures of the fragment splitting and timestamp alignment core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    /// The parser produced fewer than two tokens, so the text cannot be divided
    #[error("{}segmentation failed: '{text}' has only {tokens} token(s)", location(.sentence))]
    Segmentation {
        sentence: Option<usize>,
        text: String,
        tokens: usize,
    },

    /// Fewer spans than the number of fragments requested
    #[error("{}cannot cut {spans} span(s) into {requested} fragments", location(.sentence))]
    InsufficientSpans {
        sentence: Option<usize>,
        spans: usize,
        requested: usize,
    },

    /// A fragment stays above the maximum length and cannot be divided further
    #[error("{}fragment '{text}' has length {length} above the limit of {max_length} and cannot be split", location(.sentence))]
    UnsplittableFragment {
        sentence: Option<usize>,
        text: String,
        length: usize,
        max_length: usize,
    },

    /// Fragment tokens do not reproduce the reference token stream
    #[error("{}alignment check '{check}' failed: {detail}", location(.sentence))]
    AlignmentMismatch {
        sentence: Option<usize>,
        check: String,
        detail: String,
    },

    /// The dependency parser could not produce tokens
    #[error("{}parser failed: {}", location(.sentence), .source)]
    Parser {
        sentence: Option<usize>,
        source: ParserError,
    },
}

fn location(sentence: &Option<usize>) -> String {
    match sentence {
        Some(index) => format!("sentence {}: ", index + 1),
        None => String::new(),
    }
}

impl SplitError {
    /// Attach the index of the sentence being processed, keeping an index already present
    pub fn with_sentence(mut self, index: usize) -> Self {
        let slot = match &mut self {
            SplitError::Segmentation { sentence, .. }
            | SplitError::InsufficientSpans { sentence, .. }
            | SplitError::UnsplittableFragment { sentence, .. }
            | SplitError::AlignmentMismatch { sentence, .. }
            | SplitError::Parser { sentence, .. } => sentence,
        };
        if slot.is_none() {
            *slot = Some(index);
        }
        self
    }

    /// The sentence index the error refers to, if known
    pub fn sentence(&self) -> Option<usize> {
        match self {
            SplitError::Segmentation { sentence, .. }
            | SplitError::InsufficientSpans { sentence, .. }
            | SplitError::UnsplittableFragment { sentence, .. }
            | SplitError::AlignmentMismatch { sentence, .. }
            | SplitError::Parser { sentence, .. } => *sentence,
        }
    }

    pub(crate) fn mismatch(check: &str, detail: impl Into<String>) -> Self {
        SplitError::AlignmentMismatch {
            sentence: None,
            check: check.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<ParserError> for SplitError {
    fn from(source: ParserError) -> Self {
        SplitError::Parser {
            sentence: None,
            source,
        }
    }
}

/// Errors raised by dependency parser backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    /// The parser process could not be started or exited with a failure
    #[error("parser command failed: {0}")]
    Command(String),

    /// The parser output was not the expected token JSON
    #[error("failed to parse parser output: {0}")]
    Output(String),
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether another attempt at the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RequestFailed(_)
            | ProviderError::ConnectionError(_)
            | ProviderError::RateLimitExceeded(_)
            | ProviderError::ParseError(_) => true,
            ProviderError::ApiError { status_code, .. } => *status_code >= 500,
            ProviderError::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with nothing usable
    #[error("Empty translation for sentence {0}")]
    EmptyResponse(usize),
}

impl TranslationError {
    /// Whether another attempt at the same sentence may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Provider(e) => e.is_retryable(),
            TranslationError::EmptyResponse(_) => true,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the splitting and alignment core
    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// An external tool failed
    #[error("External tool error: {0}")]
    Tool(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
