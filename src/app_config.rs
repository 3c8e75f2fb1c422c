use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::language::{Language, LanguageProfile};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Fragment splitting settings
    #[serde(default)]
    pub split: SplitConfig,

    /// Timestamp alignment and subtitle output settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Sentence building from the transcript
    #[serde(default)]
    pub sentences: SentenceConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Download and transcription tools
    #[serde(default)]
    pub media: MediaConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How adjacent fragments are merged back after the length-bound split
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Merge while the pair fits in 0.8 of the limit, then absorb fragments shorter than 0.3
    #[default]
    Balanced,
    /// Only absorb fragments shorter than 0.3 of the limit
    Compact,
}

/// Dependency parser backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Built-in lexical rules
    #[default]
    Rule,
    /// External command printing token JSON
    Command,
}

/// Dependency parser selection
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ParserConfig {
    #[serde(default)]
    pub kind: ParserKind,

    /// Command line for the source-language parser (program followed by arguments)
    #[serde(default)]
    pub source_command: Vec<String>,

    /// Command line for the target-language parser
    #[serde(default)]
    pub target_command: Vec<String>,
}

/// Fragment splitting configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SplitConfig {
    /// Language whose length-bound split is computed first
    #[serde(default = "default_driver")]
    pub driver: Language,

    /// Maximum CJK-aware length of a target fragment
    #[serde(default = "default_max_target_length")]
    pub max_target_length: usize,

    /// Maximum character length of a source fragment
    #[serde(default = "default_max_source_length")]
    pub max_source_length: usize,

    /// Span cap for target-language segmentation
    #[serde(default = "default_max_target_spans")]
    pub max_target_spans: usize,

    /// Span cap for source-language segmentation
    #[serde(default = "default_max_source_spans")]
    pub max_source_spans: usize,

    #[serde(default)]
    pub merge_policy: MergePolicy,

    /// Pre-split pattern for target text; the match stays with the preceding chunk
    #[serde(default = "default_target_presplit_pattern")]
    pub target_presplit_pattern: String,

    /// Pre-split pattern for source text
    #[serde(default = "default_source_presplit_pattern")]
    pub source_presplit_pattern: String,

    /// Characters removed from target fragments before display
    #[serde(default = "default_target_display_punctuation")]
    pub target_display_punctuation: Option<String>,

    /// Characters removed from source fragments before display
    #[serde(default)]
    pub source_display_punctuation: Option<String>,

    /// Dependency labels that close the pending span (inclusive)
    #[serde(default = "default_boundary_labels")]
    pub boundary_labels: Vec<String>,

    /// Dependency labels that open a new span
    #[serde(default = "default_lead_labels")]
    pub lead_labels: Vec<String>,

    #[serde(default)]
    pub parser: ParserConfig,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            max_target_length: default_max_target_length(),
            max_source_length: default_max_source_length(),
            max_target_spans: default_max_target_spans(),
            max_source_spans: default_max_source_spans(),
            merge_policy: MergePolicy::default(),
            target_presplit_pattern: default_target_presplit_pattern(),
            source_presplit_pattern: default_source_presplit_pattern(),
            target_display_punctuation: default_target_display_punctuation(),
            source_display_punctuation: None,
            boundary_labels: default_boundary_labels(),
            lead_labels: default_lead_labels(),
            parser: ParserConfig::default(),
        }
    }
}

impl SplitConfig {
    /// Language profile for one side of the pair
    pub fn profile(&self, language: Language) -> Result<LanguageProfile> {
        LanguageProfile::from_config(language, self)
    }
}

/// Timestamp alignment and output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlignmentConfig {
    /// Duration given to a trailing word whose end time is unknown
    #[serde(default = "default_fallback_word_duration")]
    pub fallback_word_duration_secs: f64,

    /// Also write the combined bilingual track
    #[serde(default = "default_true")]
    pub bilingual_track: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            fallback_word_duration_secs: default_fallback_word_duration(),
            bilingual_track: true,
        }
    }
}

/// Sentence building configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SentenceConfig {
    /// Preferred maximum sentence length in characters
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Zhipu GLM (OpenAI-compatible endpoint)
    #[default]
    Zhipu,
    // @provider: Qwen through DashScope compatible mode
    Qwen,
    // @provider: OpenAI
    OpenAI,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Zhipu => "Zhipu GLM",
            Self::Qwen => "Qwen",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Zhipu => "zhipu".to_string(),
            Self::Qwen => "qwen".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }

    pub fn default_endpoint(&self) -> String {
        match self {
            Self::Zhipu => "https://open.bigmodel.cn/api/paas/v4".to_string(),
            Self::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            Self::OpenAI => "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn default_model(&self) -> String {
        match self {
            Self::Zhipu => "glm-4".to_string(),
            Self::Qwen => "qwen-plus".to_string(),
            Self::OpenAI => "gpt-4o-mini".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zhipu" | "glm" => Ok(Self::Zhipu),
            "qwen" => Ok(Self::Qwen),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model name; empty means the provider default
    #[serde(default)]
    pub model: String,

    /// API key for the service
    #[serde(default)]
    pub api_key: String,

    /// Service endpoint URL; empty means the provider default
    #[serde(default)]
    pub endpoint: String,

    /// Domain persona added to every prompt, e.g. "你是一名芯片专家"
    #[serde(default)]
    pub persona: String,

    /// Number of preceding sentences sent as context
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Translated characters per source word above which a translation is flagged
    #[serde(default = "default_ratio_limit")]
    pub ratio_limit: f64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Text substituted for a sentence whose translation failed
    #[serde(default = "default_untranslated_marker")]
    pub untranslated_marker: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            persona: String::new(),
            window_size: default_window_size(),
            concurrent_requests: default_concurrent_requests(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            ratio_limit: default_ratio_limit(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            untranslated_marker: default_untranslated_marker(),
        }
    }
}

impl TranslationConfig {
    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            self.model.clone()
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            self.provider.default_endpoint()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

/// External download and transcription tools
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// Downloader executable
    #[serde(default = "default_downloader")]
    pub downloader: String,

    /// Also download the video stream
    #[serde(default = "default_true")]
    pub download_video: bool,

    /// yt-dlp format selector for the video stream
    #[serde(default = "default_video_format")]
    pub video_format: String,

    /// yt-dlp format selector for the audio stream
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Transcriber executable
    #[serde(default = "default_transcriber")]
    pub transcriber: String,

    #[serde(default = "default_transcribe_model")]
    pub transcribe_model: String,

    #[serde(default = "default_transcribe_language")]
    pub transcribe_language: String,

    #[serde(default = "default_align_model")]
    pub align_model: String,

    /// Directory holding the transcription models
    #[serde(default)]
    pub model_dir: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            download_video: true,
            video_format: default_video_format(),
            audio_format: default_audio_format(),
            transcriber: default_transcriber(),
            transcribe_model: default_transcribe_model(),
            transcribe_language: default_transcribe_language(),
            align_model: default_align_model(),
            model_dir: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_driver() -> Language {
    Language::Target
}

fn default_max_target_length() -> usize {
    33
}

fn default_max_source_length() -> usize {
    80
}

fn default_max_target_spans() -> usize {
    15
}

fn default_max_source_spans() -> usize {
    20
}

fn default_target_presplit_pattern() -> String {
    "([。，！？；])".to_string()
}

fn default_source_presplit_pattern() -> String {
    r"([.,!?;]\s)".to_string()
}

fn default_target_display_punctuation() -> Option<String> {
    Some("[。，！？；：“”《》、]".to_string())
}

fn default_boundary_labels() -> Vec<String> {
    ["dobj", "pobj", "advcl", "aux:asp", "case", "conj", "mark", "punct", "acomp", "ccomp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_lead_labels() -> Vec<String> {
    vec!["cc".to_string(), "prep".to_string(), "sconj".to_string()]
}

fn default_fallback_word_duration() -> f64 {
    0.5
}

fn default_max_line_length() -> usize {
    80
}

fn default_window_size() -> usize {
    1
}

fn default_concurrent_requests() -> usize {
    60
}

fn default_retry_count() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_ratio_limit() -> f64 {
    3.0
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

fn default_untranslated_marker() -> String {
    "[untranslated]".to_string()
}

fn default_downloader() -> String {
    "yt-dlp".to_string()
}

fn default_video_format() -> String {
    "bestvideo[height<=1080][ext=webm]/bestvideo[height<=1080]".to_string()
}

fn default_audio_format() -> String {
    "bestaudio[ext=webm]/bestaudio".to_string()
}

fn default_transcriber() -> String {
    "whisperx".to_string()
}

fn default_transcribe_model() -> String {
    "large-v3".to_string()
}

fn default_transcribe_language() -> String {
    "en".to_string()
}

fn default_align_model() -> String {
    "WAV2VEC2_ASR_LARGE_LV60K_960H".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let split = &self.split;
        if split.max_target_length == 0 || split.max_source_length == 0 {
            return Err(anyhow!("Maximum fragment lengths must be positive"));
        }
        if split.max_target_spans < 2 || split.max_source_spans < 2 {
            return Err(anyhow!("Span caps must allow at least two spans"));
        }
        if split.parser.kind == ParserKind::Command
            && (split.parser.source_command.is_empty() || split.parser.target_command.is_empty())
        {
            return Err(anyhow!("The command parser needs both source_command and target_command"));
        }
        // Compiling the profiles checks every configured pattern
        split.profile(Language::Source)?;
        split.profile(Language::Target)?;

        if self.alignment.fallback_word_duration_secs < 0.0 {
            return Err(anyhow!("fallback_word_duration_secs cannot be negative"));
        }
        if self.sentences.max_line_length == 0 {
            return Err(anyhow!("max_line_length must be positive"));
        }
        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        Ok(())
    }

    /// Additional checks needed before calling the translation provider
    pub fn validate_for_translation(&self) -> Result<()> {
        if self.translation.api_key.trim().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for the {} provider",
                self.translation.provider.display_name()
            ));
        }
        Ok(())
    }
}
