use log::{debug, trace};

use super::ratio::ratio_groups;
use crate::app_config::MergePolicy;
use crate::errors::SplitError;
use crate::language::LanguageProfile;
use crate::segmentation::{sep, SpanSegmenter};

/// A chunk of the sentence being split
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    /// Whitespace separated the chunk from the text before it
    space_before: bool,
}

impl Piece {
    fn joined(&self, next: &Piece) -> String {
        let mut text = self.text.clone();
        if next.space_before {
            text.push(' ');
        }
        text.push_str(&next.text);
        text
    }
}

/// Splits one language's sentences into fragments no longer than the profile's maximum length
#[derive(Debug, Clone)]
pub struct LengthBoundSplitter {
    segmenter: SpanSegmenter,
    profile: LanguageProfile,
    policy: MergePolicy,
}

impl LengthBoundSplitter {
    pub fn new(segmenter: SpanSegmenter, profile: LanguageProfile, policy: MergePolicy) -> Self {
        Self {
            segmenter,
            profile,
            policy,
        }
    }

    pub fn segmenter(&self) -> &SpanSegmenter {
        &self.segmenter
    }

    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    /// Fragments of `sentence`, in order, each within the maximum length
    pub fn split(&self, sentence: &str) -> Result<Vec<String>, SplitError> {
        let sentence = sentence.trim();
        if self.profile.len(sentence) <= self.profile.max_length {
            return Ok(vec![sentence.to_string()]);
        }

        let mut pieces = self.presplit_pieces(sentence);
        debug!("[{}] pre-split into {} chunk(s)", self.profile.language, pieces.len());

        loop {
            let mut changed = false;
            let mut next = Vec::with_capacity(pieces.len() + 1);
            for piece in pieces {
                if self.profile.len(&piece.text) <= self.profile.max_length {
                    next.push(piece);
                    continue;
                }
                let halves = self.split_in_two(&piece)?;
                trace!("[{}] '{}' -> {:?}", self.profile.language, piece.text, halves);
                next.extend(halves);
                changed = true;
            }
            pieces = next;
            if !changed {
                break;
            }
        }

        Ok(self.merge_pieces(pieces).into_iter().map(|p| p.text).collect())
    }

    /// Lexical split after sentence-internal punctuation; the match stays on the preceding chunk
    pub fn presplit(&self, text: &str) -> Vec<String> {
        self.presplit_pieces(text).into_iter().map(|p| p.text).collect()
    }

    fn presplit_pieces(&self, text: &str) -> Vec<Piece> {
        let mut bounds = Vec::new();
        let mut last = 0;
        for m in self.profile.presplit.find_iter(text) {
            bounds.push((last, m.end()));
            last = m.end();
        }
        bounds.push((last, text.len()));

        let mut pieces = Vec::with_capacity(bounds.len());
        let mut space_pending = false;
        for (start, end) in bounds {
            let raw = &text[start..end];
            let chunk = raw.trim();
            if chunk.is_empty() {
                space_pending |= !raw.is_empty();
                continue;
            }
            pieces.push(Piece {
                text: chunk.to_string(),
                space_before: !pieces.is_empty() && (space_pending || raw.starts_with(char::is_whitespace)),
            });
            space_pending = raw.ends_with(char::is_whitespace);
        }
        pieces
    }

    /// Equal-ratio split of one over-length piece
    fn split_in_two(&self, piece: &Piece) -> Result<Vec<Piece>, SplitError> {
        let fragment = piece.text.as_str();
        let unsplittable = || SplitError::UnsplittableFragment {
            sentence: None,
            text: fragment.to_string(),
            length: self.profile.len(fragment),
            max_length: self.profile.max_length,
        };

        let spans = match self.segmenter.segment_capped(fragment, self.profile.max_spans) {
            Ok(spans) => spans,
            Err(SplitError::Segmentation { .. }) => return Err(unsplittable()),
            Err(e) => return Err(e),
        };
        let halves: Vec<Piece> = ratio_groups(&spans, &[1.0, 1.0], self.segmenter.metric())?
            .into_iter()
            .enumerate()
            .map(|(i, half)| Piece {
                text: half.text.trim().to_string(),
                space_before: if i == 0 { piece.space_before } else { half.space_before() },
            })
            .collect();
        if halves.len() != 2 || halves.iter().any(|h| h.text.is_empty() || h.text == fragment) {
            return Err(unsplittable());
        }
        Ok(halves)
    }

    /// Greedy merge of adjacent fragments according to the merge policy.
    ///
    /// The fragments are joined with the separator rule.
    pub fn merge(&self, fragments: Vec<String>) -> Vec<String> {
        let mut pieces: Vec<Piece> = Vec::with_capacity(fragments.len());
        for text in fragments {
            let space_before = pieces.last().is_some_and(|p| sep(&p.text, &text) == " ");
            pieces.push(Piece { text, space_before });
        }
        self.merge_pieces(pieces).into_iter().map(|p| p.text).collect()
    }

    fn merge_pieces(&self, pieces: Vec<Piece>) -> Vec<Piece> {
        let max = self.profile.max_length;
        let fill = max * 8 / 10;
        let short = max * 3 / 10;
        let pieces = match self.policy {
            MergePolicy::Balanced => self.merge_pass(pieces, |_, _, combined| combined <= fill),
            MergePolicy::Compact => pieces,
        };
        self.merge_pass(pieces, |a, b, combined| (a < short || b < short) && combined <= max)
    }

    /// Merge `i` and `i + 1` left to right while `accept(len_i, len_i+1, len_combined)` holds,
    /// repeating until a full pass changes nothing
    fn merge_pass<F>(&self, mut pieces: Vec<Piece>, accept: F) -> Vec<Piece>
    where
        F: Fn(usize, usize, usize) -> bool,
    {
        loop {
            let mut merged = false;
            let mut i = 0;
            while i + 1 < pieces.len() {
                let combined = pieces[i].joined(&pieces[i + 1]);
                let a = self.profile.len(&pieces[i].text);
                let b = self.profile.len(&pieces[i + 1].text);
                if accept(a, b, self.profile.len(&combined)) {
                    pieces[i].text = combined;
                    pieces.remove(i + 1);
                    merged = true;
                } else {
                    i += 1;
                }
            }
            if !merged {
                return pieces;
            }
        }
    }
}
