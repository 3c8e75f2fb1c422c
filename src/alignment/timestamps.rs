use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::SplitError;
use crate::splitting::FragmentDocument;

/// One ASR word; either timestamp may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

impl Word {
    pub fn new(word: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// The ASR emitted nothing but whitespace for this word
    pub fn is_blank(&self) -> bool {
        self.word.trim().is_empty()
    }
}

/// A word with both timestamps resolved, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Text with an interval, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedText {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A fragment with its interval and the intervals of its source sub-fragments
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFragment {
    pub sentence: usize,
    pub target: String,
    pub start: f64,
    pub end: f64,
    pub source: Vec<TimedText>,
}

/// Fill missing timestamps.
///
/// A missing start takes the end of the nearest preceding word with a known end (0 if none).
/// A missing end takes the start of the nearest following word with a known start, or
/// `start + fallback_duration` when there is none. Ends are never earlier than starts.
pub fn interpolate(words: &[Word], fallback_duration: f64) -> Vec<TimedWord> {
    let mut starts = Vec::with_capacity(words.len());
    let mut last_end: Option<f64> = None;
    for word in words {
        starts.push(word.start.or(last_end).unwrap_or(0.0));
        if word.end.is_some() {
            last_end = word.end;
        }
    }

    let mut next_start: Option<f64> = None;
    let mut ends = vec![0.0; words.len()];
    for (i, word) in words.iter().enumerate().rev() {
        let end = word.end.or(next_start).unwrap_or(starts[i] + fallback_duration);
        ends[i] = end.max(starts[i]);
        if word.start.is_some() {
            next_start = word.start;
        }
    }

    let filled = words.iter().filter(|w| w.start.is_none() || w.end.is_none()).count();
    if filled > 0 {
        debug!("Interpolated timestamps for {} of {} words", filled, words.len());
    }

    words
        .iter()
        .zip(starts.into_iter().zip(ends))
        .map(|(word, (start, end))| TimedWord {
            word: word.word.clone(),
            start,
            end,
        })
        .collect()
}

/// Assign intervals to every fragment by walking the word list in lockstep with the fragments.
///
/// Each source sub-fragment consumes as many words as it has whitespace tokens. Starts are
/// clamped so that no interval begins before the previous one ends, and the walk must consume
/// the word list exactly.
pub fn project(document: &FragmentDocument, words: &[TimedWord]) -> Result<Vec<TimedFragment>, SplitError> {
    let mut cursor = 0;
    let mut previous_end = 0.0_f64;
    let mut timed = Vec::with_capacity(document.fragment_count());

    for (sentence, fragment) in document.fragments() {
        let mut source = Vec::with_capacity(fragment.source.len());
        for text in &fragment.source {
            let count = text.split_whitespace().count();
            if count == 0 {
                continue;
            }
            if cursor + count > words.len() {
                return Err(SplitError::mismatch(
                    "word cursor",
                    format!(
                        "'{}' needs words {}..{} but the transcript has {} words",
                        text,
                        cursor,
                        cursor + count,
                        words.len()
                    ),
                )
                .with_sentence(sentence));
            }
            let mut start = words[cursor].start;
            let mut end = words[cursor + count - 1].end;
            cursor += count;

            if start < previous_end {
                start = previous_end;
            }
            if end < start {
                end = start;
            }
            previous_end = end;
            source.push(TimedText {
                text: text.trim().to_string(),
                start,
                end,
            });
        }

        let (Some(first), Some(last)) = (source.first(), source.last()) else {
            return Err(SplitError::mismatch(
                "fragment timing",
                format!("fragment '{}' has no source words to take timestamps from", fragment.target),
            )
            .with_sentence(sentence));
        };
        timed.push(TimedFragment {
            sentence,
            target: fragment.target.clone(),
            start: first.start,
            end: last.end,
            source,
        });
    }

    if cursor != words.len() {
        warn!("Projection stopped at word {} of {}", cursor, words.len());
        return Err(SplitError::mismatch(
            "word cursor",
            format!("fragments consumed {} words but the transcript has {}", cursor, words.len()),
        ));
    }
    Ok(timed)
}
