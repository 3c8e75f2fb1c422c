/*!
 * Dependency-driven segmentation of sentences into spans.
 *
 * - `sep`: the separator rule used whenever two text pieces are concatenated
 * - `DependencyParser`: the parser seam, with a built-in rule parser and an external
 *   command parser
 * - `SpanSegmenter`: cuts a sentence into spans, the smallest units the splitter recombines
 */

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ParserConfig, ParserKind};
use crate::errors::ParserError;
use crate::language::Language;

pub mod command_parser;
pub mod rule_parser;
pub mod segmenter;

pub use self::command_parser::CommandParser;
pub use self::rule_parser::RuleParser;
pub use self::segmenter::{Span, SpanLabels, SpanSegmenter};

/// Pieces that attach to the preceding text without a space
const NO_SEP_FOLLOW: &[&str] = &[
    ",", ".", "!", "?", ";", ":", "'", "\"", ")", "]", "n't", "'s", "-", "%",
];

/// Pieces after which the following text attaches without a space
const NO_SEP_CURRENT: &[&str] = &["$", "-"];

/// Separator to insert between `a` and `b` when concatenating them
pub fn sep(a: &str, b: &str) -> &'static str {
    let (Some(last), Some(first)) = (a.chars().last(), b.chars().next()) else {
        return "";
    };
    if a.ends_with("gon") && b.starts_with("na") {
        return "";
    }
    if !(last.is_ascii() && first.is_ascii()) {
        return "";
    }
    if first.is_whitespace() || NO_SEP_FOLLOW.iter().any(|p| b.starts_with(p)) {
        return "";
    }
    if last.is_whitespace() || NO_SEP_CURRENT.iter().any(|p| a.ends_with(p)) {
        return "";
    }
    if first.is_ascii_digit() && last == '.' {
        return "";
    }
    " "
}

/// Concatenate pieces in order using the separator rule
pub fn join<S: AsRef<str>>(pieces: &[S]) -> String {
    let mut text = String::new();
    for piece in pieces {
        let piece = piece.as_ref();
        text.push_str(sep(&text, piece));
        text.push_str(piece);
    }
    text
}

/// True when `next` continues the whitespace-delimited word that ends with `previous`.
///
/// Cutting between two glued tokens would split one source word across fragments.
pub fn glued(previous: &str, next: &str, space_between: bool) -> bool {
    !space_between
        && previous.chars().last().is_some_and(|c| c.is_ascii())
        && next.chars().next().is_some_and(|c| c.is_ascii())
}

/// One token produced by a dependency parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToken {
    pub text: String,
    /// Dependency label, e.g. `prep`, `dobj`, `punct`
    pub dep: String,
    #[serde(default)]
    pub is_sent_start: bool,
    #[serde(default)]
    pub is_sent_end: bool,
    /// Whitespace followed the token in the parsed text; `None` falls back to the separator rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<bool>,
}

impl ParsedToken {
    pub fn new(text: impl Into<String>, dep: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dep: dep.into(),
            is_sent_start: false,
            is_sent_end: false,
            space_after: None,
        }
    }

    pub fn with_space_after(mut self, space_after: bool) -> Self {
        self.space_after = Some(space_after);
        self
    }
}

/// Tokenizer plus dependency labeler for one language
pub trait DependencyParser: Send + Sync + Debug {
    /// Tokenize and label `text`, in order
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>, ParserError>;
}

/// Parser for `language` as selected in the configuration
pub fn build_parser(language: Language, config: &ParserConfig) -> Result<Arc<dyn DependencyParser>, ParserError> {
    match config.kind {
        ParserKind::Rule => Ok(Arc::new(RuleParser::new(language))),
        ParserKind::Command => {
            let command = match language {
                Language::Source => &config.source_command,
                Language::Target => &config.target_command,
            };
            Ok(Arc::new(CommandParser::new(command)?))
        }
    }
}

/// True when `piece` consists only of punctuation that attaches to the preceding span
pub fn is_trailing_punctuation(piece: &str) -> bool {
    matches!(piece, "," | "." | "!" | "?" | ";" | ":" | "'" | "\"" | "-" | "%")
        || (!piece.is_empty() && piece.chars().all(is_cjk_punctuation))
}

/// Full-width punctuation used in Chinese text
pub fn is_cjk_punctuation(c: char) -> bool {
    matches!(
        c,
        '。' | '，' | '！' | '？' | '；' | '：' | '、' | '“' | '”' | '‘' | '’' | '《' | '》' | '（' | '）'
            | '【' | '】' | '…' | '—' | '·'
    )
}
