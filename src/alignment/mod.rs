/*!
 * Re-synchronization of fragments with the word-level transcript.
 *
 * - `aligner`: token checks of fragments against sentences and ASR words
 * - `timestamps`: word model, gap interpolation and projection onto fragments
 */

pub mod aligner;
pub mod timestamps;

pub use self::aligner::{normalize_token, verify_against_sentences, verify_against_words};
pub use self::timestamps::{interpolate, project, TimedFragment, TimedText, TimedWord, Word};

use crate::errors::SplitError;
use crate::splitting::FragmentDocument;

/// Run both token checks, then project word timestamps onto the fragments.
///
/// Blank words are skipped, as the sentence builder skips them.
pub fn align(
    document: &FragmentDocument,
    words: &[Word],
    fallback_duration: f64,
) -> Result<Vec<TimedFragment>, SplitError> {
    let words: Vec<Word> = words.iter().filter(|w| !w.is_blank()).cloned().collect();
    verify_against_sentences(document)?;
    verify_against_words(document, &words)?;
    let timed_words = interpolate(&words, fallback_duration);
    project(document, &timed_words)
}
