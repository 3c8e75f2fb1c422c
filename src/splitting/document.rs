/*!
 * Intermediate fragment document.
 *
 * Hand-off between the splitter and the aligner. It is written as pretty-printed JSON so an
 * operator can fix a fragment by hand before timestamps are projected.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One target fragment and the source sub-fragments it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub target: String,
    pub source: Vec<String>,
}

impl Fragment {
    /// Whitespace tokens of the source side, in order
    pub fn source_tokens(&self) -> impl Iterator<Item = &str> {
        self.source.iter().flat_map(|s| s.split_whitespace())
    }

    /// The source sub-fragments joined for display
    pub fn source_text(&self) -> String {
        self.source.join(" ")
    }
}

/// All fragments of one sentence pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceFragments {
    /// Zero-based line number in the sentence files
    pub index: usize,
    pub target: String,
    pub source: String,
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentDocument {
    pub sentences: Vec<SentenceFragments>,
}

impl FragmentDocument {
    pub fn new(sentences: Vec<SentenceFragments>) -> Self {
        Self { sentences }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse fragment document")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize fragment document")
    }

    /// Every fragment with the index of its sentence, in document order
    pub fn fragments(&self) -> impl Iterator<Item = (usize, &Fragment)> {
        self.sentences
            .iter()
            .flat_map(|s| s.fragments.iter().map(move |f| (s.index, f)))
    }

    pub fn fragment_count(&self) -> usize {
        self.sentences.iter().map(|s| s.fragments.len()).sum()
    }
}
