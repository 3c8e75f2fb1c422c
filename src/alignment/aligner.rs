/*!
 * Token-level reconciliation of fragments with their reference texts.
 *
 * Before timestamps are projected, the flattened source tokens of all fragments must equal
 * the flattened tokens of the source sentences and the ASR words, modulo one trailing `,` or
 * `.` per token. Any difference means a splitter or transcription bug and stops the run.
 */

use log::debug;

use super::timestamps::Word;
use crate::errors::SplitError;
use crate::splitting::FragmentDocument;

/// Strip a single trailing `,` or `.`
pub fn normalize_token(token: &str) -> &str {
    token
        .strip_suffix(',')
        .or_else(|| token.strip_suffix('.'))
        .unwrap_or(token)
}

/// Source tokens of every fragment, tagged with their sentence index
fn fragment_tokens(document: &FragmentDocument) -> Vec<(usize, &str)> {
    document
        .fragments()
        .flat_map(|(sentence, fragment)| fragment.source_tokens().map(move |t| (sentence, t)))
        .collect()
}

/// Fragments must reproduce the whitespace tokens of their source sentences
pub fn verify_against_sentences(document: &FragmentDocument) -> Result<(), SplitError> {
    let reference: Vec<(usize, &str)> = document
        .sentences
        .iter()
        .flat_map(|s| s.source.split_whitespace().map(move |t| (s.index, t)))
        .collect();
    compare("fragment tokens vs sentences", &fragment_tokens(document), &reference)
}

/// Fragments must reproduce the ASR word sequence
pub fn verify_against_words(document: &FragmentDocument, words: &[Word]) -> Result<(), SplitError> {
    let fragments = fragment_tokens(document);
    // Words carry no sentence; borrow the fragment side's index at the same position
    let reference: Vec<(usize, &str)> = words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let sentence = fragments.get(i).or(fragments.last()).map_or(0, |(s, _)| *s);
            (sentence, w.word.trim())
        })
        .collect();
    compare("fragment tokens vs transcript words", &fragments, &reference)
}

fn compare(check: &str, actual: &[(usize, &str)], expected: &[(usize, &str)]) -> Result<(), SplitError> {
    for (position, ((sentence, got), (_, want))) in actual.iter().zip(expected).enumerate() {
        if normalize_token(got) != normalize_token(want) {
            return Err(SplitError::mismatch(
                check,
                format!("token {}: fragment has '{}' where '{}' is expected", position, got, want),
            )
            .with_sentence(*sentence));
        }
    }

    if actual.len() != expected.len() {
        let sentence = actual
            .get(expected.len())
            .or(expected.get(actual.len()))
            .map(|(s, _)| *s);
        let err = SplitError::mismatch(
            check,
            format!("fragments have {} tokens, reference has {}", actual.len(), expected.len()),
        );
        return Err(match sentence {
            Some(index) => err.with_sentence(index),
            None => err,
        });
    }

    debug!("Alignment check '{}' passed over {} tokens", check, actual.len());
    Ok(())
}
