use log::debug;

use super::document::{Fragment, FragmentDocument, SentenceFragments};
use super::length_bound::LengthBoundSplitter;
use super::ratio::ratio_split;
use crate::app_config::SplitConfig;
use crate::errors::SplitError;
use crate::language::Language;
use crate::segmentation::{Span, SpanSegmenter};

/// Splits sentence pairs into bilingual fragments.
///
/// The driver language is split by length first; the other language is then cut into the same
/// number of fragments following the driver's length ratio.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    source: LengthBoundSplitter,
    target: LengthBoundSplitter,
    driver: Language,
}

impl SentenceSplitter {
    pub fn new(source: LengthBoundSplitter, target: LengthBoundSplitter, driver: Language) -> Self {
        Self {
            source,
            target,
            driver,
        }
    }

    pub fn from_config(config: &SplitConfig) -> anyhow::Result<Self> {
        let build = |language: Language| -> anyhow::Result<LengthBoundSplitter> {
            Ok(LengthBoundSplitter::new(
                SpanSegmenter::from_config(language, config)?,
                config.profile(language)?,
                config.merge_policy,
            ))
        };
        Ok(Self::new(build(Language::Source)?, build(Language::Target)?, config.driver))
    }

    pub fn driver(&self) -> Language {
        self.driver
    }

    fn splitter(&self, language: Language) -> &LengthBoundSplitter {
        match language {
            Language::Source => &self.source,
            Language::Target => &self.target,
        }
    }

    /// Fragments of one sentence pair
    pub fn split_sentence(&self, source: &str, target: &str) -> Result<Vec<Fragment>, SplitError> {
        let (driver_text, other_text) = match self.driver {
            Language::Source => (source, target),
            Language::Target => (target, source),
        };
        let driver = self.splitter(self.driver);

        let driver_fragments = driver.split(driver_text)?;
        let ratio: Vec<f64> = driver_fragments
            .iter()
            .map(|f| driver.profile().len(f).max(1) as f64)
            .collect();
        let other_fragments = self.fit_other(other_text, &ratio)?;

        let target_profile = self.target.profile();
        let mut fragments = Vec::with_capacity(driver_fragments.len());
        for (driver_fragment, other_fragment) in driver_fragments.iter().zip(other_fragments) {
            let fragment = match self.driver {
                Language::Target => {
                    let source = if self.source.profile().len(&other_fragment) > self.source.profile().max_length {
                        self.source.split(&other_fragment)?
                    } else {
                        vec![other_fragment.trim().to_string()]
                    };
                    Fragment {
                        target: target_profile.clean_for_display(driver_fragment),
                        source,
                    }
                }
                Language::Source => Fragment {
                    target: target_profile.clean_for_display(&other_fragment),
                    source: vec![driver_fragment.trim().to_string()],
                },
            };
            fragments.push(fragment);
        }
        debug!("Split into {} fragment(s): {:?}", fragments.len(), fragments);
        Ok(fragments)
    }

    /// Cut the other language's sentence into `ratio.len()` fragments following `ratio`
    fn fit_other(&self, text: &str, ratio: &[f64]) -> Result<Vec<String>, SplitError> {
        let count = ratio.len();
        if count == 1 {
            return Ok(vec![text.trim().to_string()]);
        }

        let other = self.splitter(self.driver.other());
        let cap = other.profile().max_spans.max(count);
        let mut spans = other.segmenter().segment_capped(text, cap)?;
        refine_spans(&mut spans, count, other.segmenter())?;
        ratio_split(&spans, ratio, other.segmenter().metric())
    }

    /// Split every sentence pair; errors carry the index of the failing sentence
    pub fn split_document<S: AsRef<str>>(&self, sources: &[S], targets: &[S]) -> Result<FragmentDocument, SplitError> {
        let mut sentences = Vec::with_capacity(sources.len());
        for (index, (source, target)) in sources.iter().zip(targets).enumerate() {
            let (source, target) = (source.as_ref(), target.as_ref());
            let fragments = self
                .split_sentence(source, target)
                .map_err(|e| e.with_sentence(index))?;
            sentences.push(SentenceFragments {
                index,
                target: target.to_string(),
                source: source.to_string(),
                fragments,
            });
        }
        Ok(FragmentDocument::new(sentences))
    }
}

/// Halve the longest multi-token span until there are at least `count` spans
fn refine_spans(spans: &mut Vec<Span>, count: usize, segmenter: &SpanSegmenter) -> Result<(), SplitError> {
    let metric = segmenter.metric();
    while spans.len() < count {
        let mut longest: Option<(usize, usize)> = None;
        for (i, span) in spans.iter().enumerate() {
            let length = metric.len(&span.text);
            if span.tokens.len() >= 2 && longest.is_none_or(|(_, best)| length > best) {
                longest = Some((i, length));
            }
        }
        let halves = longest.and_then(|(i, _)| spans[i].halve().map(|halves| (i, halves)));
        let Some((i, (left, right))) = halves else {
            return Err(SplitError::InsufficientSpans {
                sentence: None,
                spans: spans.len(),
                requested: count,
            });
        };
        spans.splice(i..=i, [left, right]);
    }
    Ok(())
}
