/*!
 * Sentence building from the word-level transcript.
 *
 * Words are grouped into sentences at terminal punctuation. Very long sentences are cut at a
 * comma followed by a conjunction or subject pronoun, and short neighbours are merged so that
 * each line sent to translation carries enough context.
 */

use log::{debug, info};

use crate::alignment::Word;
use crate::app_config::SentenceConfig;

const CONJUNCTIONS: &[&str] = &["and", "but", "or", "so", "yet", "because", "although", "while"];

const SUBJECT_PRONOUNS: &[&str] = &["i", "you", "he", "she", "it", "we", "they", "this", "that", "there"];

#[derive(Debug, Clone)]
pub struct SentenceBuilder {
    max_line_length: usize,
}

impl SentenceBuilder {
    pub fn new(max_line_length: usize) -> Self {
        Self { max_line_length }
    }

    pub fn from_config(config: &SentenceConfig) -> Self {
        Self::new(config.max_line_length)
    }

    /// Source-language lines, one sentence each, whose tokens are exactly the transcript words
    pub fn build(&self, words: &[Word]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for word in words.iter().filter(|w| !w.is_blank()).map(|w| w.word.trim()) {
            current.push(word);
            if word.ends_with(['.', '?', '!']) {
                lines.extend(self.cut_long(&current));
                current.clear();
            }
        }
        if !current.is_empty() {
            lines.extend(self.cut_long(&current));
        }

        let sentence_count = lines.len();
        let lines = merge_short_lines(lines, self.max_line_length);
        info!("Built {} lines from {} sentences", lines.len(), sentence_count);
        lines
    }

    /// Cut a sentence longer than twice the line length before a conjunction or subject pronoun
    /// that follows a comma
    fn cut_long(&self, tokens: &[&str]) -> Vec<String> {
        let sentence = tokens.join(" ");
        if sentence.chars().count() <= self.max_line_length * 2 {
            return vec![sentence];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        for i in 0..tokens.len().saturating_sub(1) {
            let next = tokens[i + 1].to_lowercase();
            let opens_clause = CONJUNCTIONS.contains(&next.as_str()) || SUBJECT_PRONOUNS.contains(&next.as_str());
            if tokens[i].ends_with([',', ';', ':']) && opens_clause {
                chunks.push(tokens[start..=i].join(" "));
                start = i + 1;
            }
        }
        chunks.push(tokens[start..].join(" "));
        debug!("Long sentence cut into {} chunk(s)", chunks.len());
        chunks
    }
}

/// Build source-language lines from transcript words with the given line length
pub fn from_words(words: &[Word], max_line_length: usize) -> Vec<String> {
    SentenceBuilder::new(max_line_length).build(words)
}

/// Merge adjacent lines in three sweeps: combined length under 0.8 of the maximum; either line
/// under 0.25 of the maximum with the combined length under the maximum; either line under 0.1
/// of the maximum.
pub fn merge_short_lines(lines: Vec<String>, max_line_length: usize) -> Vec<String> {
    let fill = max_line_length * 8 / 10;
    let short = max_line_length / 4;
    let tiny = max_line_length / 10;

    let lines = sweep(lines, |a, b| a + b < fill);
    let lines = sweep(lines, |a, b| (a < short || b < short) && a + b < max_line_length);
    sweep(lines, |a, b| a < tiny || b < tiny)
}

/// One left-to-right sweep merging `i` into `i + 1` while `accept(len_i, len_i+1)` holds
fn sweep<F>(mut lines: Vec<String>, accept: F) -> Vec<String>
where
    F: Fn(usize, usize) -> bool,
{
    let mut i = 0;
    while i + 1 < lines.len() {
        if accept(lines[i].chars().count(), lines[i + 1].chars().count()) {
            let next = lines.remove(i + 1);
            lines[i].push(' ');
            lines[i].push_str(&next);
        } else {
            i += 1;
        }
    }
    lines
}
