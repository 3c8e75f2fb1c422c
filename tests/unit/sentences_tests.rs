/*!
 * Tests for building sentence lines from transcript words
 */

use subator::sentences::{self, merge_short_lines, SentenceBuilder};
use subator::Word;

use crate::common;

fn words(text: &str) -> Vec<Word> {
    text.split_whitespace().map(|w| Word::new(w, None, None)).collect()
}

#[test]
fn test_from_words_withShortSentences_shouldMergeThem() {
    let lines = sentences::from_words(&common::sample_words(), 80);
    assert_eq!(lines, vec!["Hello everyone. Today we talk about chips."]);
}

#[test]
fn test_build_withNarrowLines_shouldKeepSentencesApart() {
    let lines = SentenceBuilder::new(20).build(&common::sample_words());
    assert_eq!(lines, vec!["Hello everyone.", "Today we talk about chips."]);
}

#[test]
fn test_build_withoutFinalPunctuation_shouldKeepTrailingWords() {
    let lines = SentenceBuilder::new(20).build(&words("This one ends. And this one does not"));
    assert_eq!(lines.last().map(String::as_str), Some("And this one does not"));
    let total: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
    assert_eq!(total, 8);
}

#[test]
fn test_merge_short_lines_shouldAbsorbTinyLines() {
    let lines = vec![
        "A fairly long opening sentence with many words.".to_string(),
        "Ok.".to_string(),
    ];
    let merged = merge_short_lines(lines, 50);
    assert_eq!(merged, vec!["A fairly long opening sentence with many words. Ok."]);
}

#[test]
fn test_build_withEmptyTranscript_shouldReturnNoLines() {
    assert!(SentenceBuilder::new(80).build(&[]).is_empty());
}
