use log::trace;
use std::collections::HashSet;
use std::sync::Arc;

use super::{build_parser, glued, is_trailing_punctuation, sep, DependencyParser, ParsedToken};
use crate::app_config::SplitConfig;
use crate::errors::SplitError;
use crate::language::{Language, LengthMetric};
use crate::splitting::ratio::merge_by_num;

/// Smallest recombination unit of a sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Tokens joined with the whitespace they had in the sentence
    pub text: String,
    pub tokens: Vec<String>,
    /// Whether whitespace preceded each token; the first entry refers to the previous span
    pub spaces: Vec<bool>,
}

impl Span {
    pub fn new(tokens: Vec<String>, spaces: Vec<bool>) -> Self {
        let mut text = String::new();
        for (i, (token, space)) in tokens.iter().zip(&spaces).enumerate() {
            if i > 0 && *space {
                text.push(' ');
            }
            text.push_str(token);
        }
        Self { text, tokens, spaces }
    }

    /// Span whose token spacing follows the separator rule
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let spaces = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                // the first token is spaced as if it followed a plain word
                let previous = if i == 0 { "w" } else { tokens[i - 1].as_str() };
                sep(previous, token) == " "
            })
            .collect();
        Self::new(tokens, spaces)
    }

    /// Whitespace separated this span from the text before it
    pub fn space_before(&self) -> bool {
        self.spaces.first().copied().unwrap_or(false)
    }

    /// Append this span's text to `text`, spaced as in the sentence
    pub fn append_to(&self, text: &mut String) {
        if !text.is_empty() && self.space_before() {
            text.push(' ');
        }
        text.push_str(&self.text);
    }

    /// Append `other` to this span
    pub fn absorb(&mut self, other: Span) {
        other.append_to(&mut self.text);
        self.tokens.extend(other.tokens);
        self.spaces.extend(other.spaces);
    }

    /// Cut the token sequence at the word boundary nearest its midpoint, or at the midpoint
    /// itself when the span is a single word; `None` for single-token spans
    pub fn halve(&self) -> Option<(Span, Span)> {
        if self.tokens.len() < 2 {
            return None;
        }
        let mid = self.tokens.len() / 2;
        let cut = (1..self.tokens.len())
            .filter(|&i| !glued(&self.tokens[i - 1], &self.tokens[i], self.spaces[i]))
            .min_by_key(|&i| i.abs_diff(mid))
            .unwrap_or(mid);
        Some((
            Span::new(self.tokens[..cut].to_vec(), self.spaces[..cut].to_vec()),
            Span::new(self.tokens[cut..].to_vec(), self.spaces[cut..].to_vec()),
        ))
    }

    fn is_punctuation(&self) -> bool {
        self.tokens.iter().all(|t| is_trailing_punctuation(t))
    }

    /// This span starts inside the word `previous` ends with
    fn continues(&self, previous: &Span) -> bool {
        match (previous.tokens.last(), self.tokens.first()) {
            (Some(last), Some(first)) => glued(last, first, self.space_before()),
            _ => false,
        }
    }
}

/// Dependency label sets driving span boundaries
#[derive(Debug, Clone)]
pub struct SpanLabels {
    boundary: HashSet<String>,
    lead: HashSet<String>,
}

impl SpanLabels {
    pub fn new(boundary: &[String], lead: &[String]) -> Self {
        Self {
            boundary: boundary.iter().cloned().collect(),
            lead: lead.iter().cloned().collect(),
        }
    }

    /// Token closes the pending span, inclusive
    fn closes(&self, token: &ParsedToken) -> bool {
        token.is_sent_end || self.boundary.contains(&token.dep)
    }

    /// Token opens a new span
    fn opens(&self, token: &ParsedToken) -> bool {
        token.is_sent_start || self.lead.contains(&token.dep)
    }
}

impl Default for SpanLabels {
    fn default() -> Self {
        let config = SplitConfig::default();
        Self::new(&config.boundary_labels, &config.lead_labels)
    }
}

/// Cuts sentences of one language into spans
#[derive(Debug, Clone)]
pub struct SpanSegmenter {
    parser: Arc<dyn DependencyParser>,
    labels: SpanLabels,
    metric: LengthMetric,
}

impl SpanSegmenter {
    pub fn new(parser: Arc<dyn DependencyParser>, labels: SpanLabels, metric: LengthMetric) -> Self {
        Self { parser, labels, metric }
    }

    /// Segmenter for `language` using the configured parser and label sets
    pub fn from_config(language: Language, config: &SplitConfig) -> Result<Self, SplitError> {
        let parser = build_parser(language, &config.parser)?;
        Ok(Self::new(
            parser,
            SpanLabels::new(&config.boundary_labels, &config.lead_labels),
            language.metric(),
        ))
    }

    pub fn metric(&self) -> LengthMetric {
        self.metric
    }

    /// Spans of `text` in order.
    ///
    /// Fails with `Segmentation` when the parser yields fewer than two tokens. When the walk
    /// produces a single span, it is halved near its midpoint so callers always receive at
    /// least two spans.
    pub fn segment(&self, text: &str) -> Result<Vec<Span>, SplitError> {
        let tokens = self.parser.parse(text)?;
        if tokens.len() < 2 {
            return Err(SplitError::Segmentation {
                sentence: None,
                text: text.to_string(),
                tokens: tokens.len(),
            });
        }

        let mut spans = self.group(&tokens);
        if spans.len() == 1 {
            trace!("Single span for '{}', cutting near the token midpoint", text);
            let whole = spans.remove(0);
            spans = match whole.halve() {
                Some((left, right)) => vec![left, right],
                None => vec![whole],
            };
        }
        trace!(
            "Spans: {:?}",
            spans.iter().map(|s| s.text.as_str()).collect::<Vec<_>>()
        );
        Ok(spans)
    }

    /// Like `segment`, merging adjacent spans down to `max_spans` when the parse is too fine
    pub fn segment_capped(&self, text: &str, max_spans: usize) -> Result<Vec<Span>, SplitError> {
        let spans = self.segment(text)?;
        if spans.len() > max_spans {
            trace!("Merging {} spans down to {}", spans.len(), max_spans);
            return Ok(merge_by_num(spans, max_spans, self.metric));
        }
        Ok(spans)
    }

    fn group(&self, tokens: &[ParsedToken]) -> Vec<Span> {
        let mut groups: Vec<Vec<(String, bool)>> = Vec::new();
        let mut pending: Vec<(String, bool)> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if self.labels.opens(token) && !pending.is_empty() {
                groups.push(std::mem::take(&mut pending));
            }
            let space = match i.checked_sub(1).map(|p| &tokens[p]) {
                None => false,
                Some(previous) => previous
                    .space_after
                    .unwrap_or_else(|| sep(&previous.text, &token.text) == " "),
            };
            pending.push((token.text.clone(), space));
            if self.labels.closes(token) {
                groups.push(std::mem::take(&mut pending));
            }
        }
        if !pending.is_empty() {
            groups.push(pending);
        }

        let mut spans: Vec<Span> = Vec::with_capacity(groups.len());
        for group in groups {
            let (tokens, spaces) = group.into_iter().unzip();
            let span = Span::new(tokens, spaces);
            match spans.last_mut() {
                Some(previous) if span.is_punctuation() || span.continues(previous) => previous.absorb(span),
                _ => spans.push(span),
            }
        }
        spans
    }
}
