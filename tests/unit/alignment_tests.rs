/*!
 * Tests for token checks and timestamp projection
 */

use anyhow::Result;
use subator::alignment::{self, interpolate, normalize_token, Word};
use subator::errors::SplitError;
use subator::splitting::{Fragment, FragmentDocument, SentenceFragments};

use crate::common;

fn sample_document() -> FragmentDocument {
    FragmentDocument::new(vec![
        SentenceFragments {
            index: 0,
            target: "大家好。".to_string(),
            source: "Hello everyone.".to_string(),
            fragments: vec![Fragment {
                target: "大家好".to_string(),
                source: vec!["Hello everyone.".to_string()],
            }],
        },
        SentenceFragments {
            index: 1,
            target: "今天我们聊聊芯片。".to_string(),
            source: "Today we talk about chips.".to_string(),
            fragments: vec![
                Fragment {
                    target: "今天我们".to_string(),
                    source: vec!["Today we".to_string()],
                },
                Fragment {
                    target: "聊聊芯片".to_string(),
                    source: vec!["talk".to_string(), "about chips.".to_string()],
                },
            ],
        },
    ])
}

#[test]
fn test_normalize_token_shouldStripOneTrailingMark() {
    assert_eq!(normalize_token("chips."), "chips");
    assert_eq!(normalize_token("well,"), "well");
    assert_eq!(normalize_token("wait..."), "wait..");
    assert_eq!(normalize_token("U.S"), "U.S");
}

#[test]
fn test_interpolate_shouldFillMissingTimes() {
    let words = vec![
        Word::new("so", None, None),
        Word::new("we", Some(1.0), None),
        Word::new("start", None, Some(2.0)),
        Word::new("now", Some(2.5), None),
    ];
    let timed = interpolate(&words, 0.5);

    assert_eq!(timed[0].start, 0.0);
    assert_eq!(timed[0].end, 1.0);
    // A missing end runs to the next known start
    assert_eq!(timed[1].end, 2.5);
    // No earlier word has an end, so the start falls back to zero
    assert_eq!(timed[2].start, 0.0);
    assert_eq!(timed[3].end, 3.0);
    assert!(timed.iter().all(|w| w.end >= w.start));
}

#[test]
fn test_align_shouldTimeEverySubFragment() -> Result<()> {
    let timed = alignment::align(&sample_document(), &common::sample_words(), 0.5)?;

    assert_eq!(timed.len(), 3);
    assert_eq!((timed[0].start, timed[0].end), (0.0, 1.0));
    assert_eq!(timed[1].sentence, 1);
    assert_eq!((timed[1].start, timed[1].end), (1.5, 2.0));

    // "talk" has no end, it runs until "about" starts
    let last = &timed[2];
    assert_eq!(last.source.len(), 2);
    assert_eq!((last.source[0].start, last.source[0].end), (2.0, 2.3));
    assert_eq!((last.start, last.end), (2.0, 3.2));
    Ok(())
}

#[test]
fn test_align_withChangedFragmentToken_shouldNameSentence() {
    let mut document = sample_document();
    document.sentences[1].fragments[1].source = vec!["talk".to_string(), "about chip".to_string()];

    let err = alignment::align(&document, &common::sample_words(), 0.5).unwrap_err();
    assert!(matches!(err, SplitError::AlignmentMismatch { sentence: Some(1), .. }));
}

#[test]
fn test_align_withBlankTranscriptWords_shouldSkipThem() -> Result<()> {
    let mut words = common::sample_words();
    words.insert(2, Word::new(" ", Some(1.0), Some(1.5)));
    words.push(Word::new("", None, None));

    let timed = alignment::align(&sample_document(), &words, 0.5)?;
    let expected = alignment::align(&sample_document(), &common::sample_words(), 0.5)?;
    assert_eq!(timed, expected);
    Ok(())
}

#[test]
fn test_align_withMissingTranscriptWord_shouldFail() {
    let mut words = common::sample_words();
    words.pop();

    let err = alignment::align(&sample_document(), &words, 0.5).unwrap_err();
    assert!(err.to_string().contains("7 tokens, reference has 6"), "{}", err);
}
