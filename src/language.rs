/*!
 * Languages handled by the splitter and their length semantics.
 *
 * The pipeline works on exactly two languages: the spoken source language, tokenized on
 * whitespace and measured in characters, and the translated target language, measured with
 * a CJK-aware metric. Everything that differs between them (metric, punctuation patterns,
 * limits) lives in a `LanguageProfile` chosen once at setup.
 */

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_config::SplitConfig;

/// The two languages of a subtitle pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Spoken language of the video (English)
    Source,
    /// Translation language (Chinese)
    Target,
}

impl Language {
    /// The other language of the pair
    pub fn other(self) -> Self {
        match self {
            Language::Source => Language::Target,
            Language::Target => Language::Source,
        }
    }

    /// Length metric used for this language
    pub fn metric(self) -> LengthMetric {
        match self {
            Language::Source => LengthMetric::Chars,
            Language::Target => LengthMetric::CjkAware,
        }
    }

    /// Short tag used in file names and logs
    pub fn tag(self) -> &'static str {
        match self {
            Language::Source => "en",
            Language::Target => "ch",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Length function over display text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMetric {
    /// Unicode code point count
    Chars,
    /// Runs of ASCII non-whitespace count as one unit, everything else counts per character
    CjkAware,
}

impl LengthMetric {
    pub fn len(self, text: &str) -> usize {
        match self {
            LengthMetric::Chars => text.chars().count(),
            LengthMetric::CjkAware => cjk_len(text),
        }
    }
}

fn cjk_len(text: &str) -> usize {
    let mut length = 0;
    let mut in_ascii_run = false;
    for c in text.chars() {
        if c.is_ascii() && !c.is_ascii_whitespace() {
            if !in_ascii_run {
                length += 1;
                in_ascii_run = true;
            }
        } else {
            length += 1;
            in_ascii_run = false;
        }
    }
    length
}

/// Everything the splitter needs to know about one language
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub language: Language,
    pub metric: LengthMetric,
    /// Maximum display length of one fragment
    pub max_length: usize,
    /// Upper bound on the span count fed into the ratio search
    pub max_spans: usize,
    /// Sentence-internal punctuation used for the lexical pre-split
    pub presplit: Regex,
    /// Characters replaced by spaces before display, if any
    pub display_punctuation: Option<Regex>,
}

impl LanguageProfile {
    /// Build the profile for `language` from the split configuration
    pub fn from_config(language: Language, config: &SplitConfig) -> anyhow::Result<Self> {
        let (max_length, max_spans, pattern, display) = match language {
            Language::Source => (
                config.max_source_length,
                config.max_source_spans,
                &config.source_presplit_pattern,
                &config.source_display_punctuation,
            ),
            Language::Target => (
                config.max_target_length,
                config.max_target_spans,
                &config.target_presplit_pattern,
                &config.target_display_punctuation,
            ),
        };
        let presplit = Regex::new(pattern)
            .map_err(|e| anyhow::anyhow!("Invalid {} pre-split pattern '{}': {}", language, pattern, e))?;
        let display_punctuation = match display {
            Some(p) if !p.is_empty() => Some(
                Regex::new(p)
                    .map_err(|e| anyhow::anyhow!("Invalid {} display punctuation '{}': {}", language, p, e))?,
            ),
            _ => None,
        };
        Ok(Self {
            language,
            metric: language.metric(),
            max_length,
            max_spans,
            presplit,
            display_punctuation,
        })
    }

    /// Metric length of `text`
    pub fn len(&self, text: &str) -> usize {
        self.metric.len(text)
    }

    /// Clean a fragment for display: drop display punctuation and trim whitespace
    pub fn clean_for_display(&self, text: &str) -> String {
        match &self.display_punctuation {
            Some(re) => {
                let replaced = re.replace_all(text, " ");
                replaced.split_whitespace().collect::<Vec<_>>().join(" ")
            }
            None => text.trim().to_string(),
        }
    }
}
