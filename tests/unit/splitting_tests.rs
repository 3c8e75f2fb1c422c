/*!
 * Tests for paired fragment splitting
 */

use anyhow::Result;
use subator::app_config::{MergePolicy, SplitConfig};
use subator::errors::SplitError;
use subator::language::{Language, LengthMetric};
use subator::segmentation::Span;
use subator::splitting::{ratio_split, FragmentDocument, SentenceSplitter};

use crate::common;

fn span(text: &str) -> Span {
    Span::from_tokens(text.split_whitespace().map(String::from).collect())
}

fn narrow_config() -> SplitConfig {
    SplitConfig {
        max_source_length: 30,
        max_target_length: 12,
        ..SplitConfig::default()
    }
}

#[test]
fn test_ratio_split_shouldPickBestMatchingCut() -> Result<()> {
    let spans = vec![span("aaaa"), span("bb"), span("cccccc")];
    let groups = ratio_split(&spans, &[1.0, 1.0], LengthMetric::Chars)?;
    assert_eq!(groups, vec!["aaaa bb", "cccccc"]);
    Ok(())
}

#[test]
fn test_ratio_split_withTooFewSpans_shouldFail() {
    let spans = vec![span("only one")];
    let err = ratio_split(&spans, &[1.0, 2.0], LengthMetric::Chars).unwrap_err();
    assert!(matches!(err, SplitError::InsufficientSpans { spans: 1, requested: 2, .. }));
}

#[test]
fn test_split_document_withShortPairs_shouldKeepOneFragmentEach() -> Result<()> {
    let (sources, targets) = common::sample_pairs();
    let splitter = SentenceSplitter::from_config(&SplitConfig::default())?;
    let document = splitter.split_document(&sources, &targets)?;

    assert_eq!(document.fragment_count(), 2);
    assert_eq!(document.sentences[1].index, 1);
    let first = &document.sentences[0].fragments[0];
    assert_eq!(first.target, "大家好");
    assert_eq!(first.source, vec!["Hello everyone."]);
    Ok(())
}

#[test]
fn test_split_document_withLongPair_shouldRespectLimitsAndTokens() -> Result<()> {
    let sources = ["We tested the model on the new chip, but the results were disappointing because memory bandwidth became the bottleneck."];
    let targets = ["我们在新芯片上测试了模型，但是结果令人失望，因为内存带宽成为了瓶颈。"];
    for policy in [MergePolicy::Balanced, MergePolicy::Compact] {
        let config = SplitConfig {
            merge_policy: policy,
            ..narrow_config()
        };
        let document = SentenceSplitter::from_config(&config)?.split_document(&sources, &targets)?;

        assert!(document.fragment_count() >= 2);
        let tokens: Vec<&str> = document.fragments().flat_map(|(_, f)| f.source_tokens()).collect();
        assert_eq!(tokens, sources[0].split_whitespace().collect::<Vec<_>>());
        for (_, fragment) in document.fragments() {
            assert!(LengthMetric::CjkAware.len(&fragment.target) <= 12, "{:?} too long", fragment.target);
            assert!(!fragment.target.is_empty());
        }
    }
    Ok(())
}

#[test]
fn test_split_document_shouldSurviveJsonHandOff() -> Result<()> {
    let (sources, targets) = common::sample_pairs();
    let document = SentenceSplitter::from_config(&SplitConfig::default())?.split_document(&sources, &targets)?;
    let reloaded = FragmentDocument::from_json(&document.to_json()?)?;
    assert_eq!(reloaded, document);
    Ok(())
}

#[test]
fn test_split_document_withUnsplittableSource_shouldReportSentence() -> Result<()> {
    let splitter = SentenceSplitter::from_config(&narrow_config())?;
    let sources = ["Fine.", "Fine.", "Supercalifragilistic"];
    let targets = ["好。", "好。", "这是一个非常非常长的中文句子，需要被切分成好几个部分才能显示。"];
    let err = splitter.split_document(&sources, &targets).unwrap_err();
    assert_eq!(err.sentence(), Some(2));
    assert!(err.to_string().starts_with("sentence 3: "));
    Ok(())
}

/// Sentence pairs whose source side mixes quotes, clitics, currency, percentages and decimals
const TRICKY_PAIRS: &[(&str, &str)] = &[
    (
        "He told me \"no way\" and then he walked out of the room without a word.",
        "他跟我说“没门”，然后一言不发地走出了房间。",
    ),
    (
        "We're rocking 'til dawn, 'cause the band said it's fine and the crowd loves 'em all night.",
        "我们要一直摇滚到天亮，因为乐队说没问题，而且观众整晚都很喜欢他们。",
    ),
    (
        "The chip costs $3.50 more, which is about 12.5% higher than last year's price for the same part.",
        "这款芯片贵了3.50美元，比去年同一部件的价格高出大约12.5%。",
    ),
    (
        "She said \"it's 3.14159, not 3.2\" and laughed at the old textbook's rounding error.",
        "她说“是3.14159，不是3.2”，然后笑了那本旧课本的舍入错误。",
    ),
];

#[test]
fn test_split_sentence_withTrickyTokens_shouldPreserveSourceWords() -> Result<()> {
    for driver in [Language::Target, Language::Source] {
        let config = SplitConfig {
            driver,
            ..narrow_config()
        };
        let splitter = SentenceSplitter::from_config(&config)?;
        for (source, target) in TRICKY_PAIRS {
            let fragments = splitter.split_sentence(source, target)?;
            assert!(fragments.len() >= 2, "{:?} was not split with {:?} driving", source, driver);
            let words: Vec<&str> = fragments.iter().flat_map(|f| f.source_tokens()).collect();
            assert_eq!(
                words,
                source.split_whitespace().collect::<Vec<_>>(),
                "words changed with {:?} driving",
                driver
            );
            for sub in fragments.iter().flat_map(|f| f.source.iter()) {
                assert!(sub.chars().count() <= 30, "{:?} too long", sub);
            }
        }
    }
    Ok(())
}

#[test]
fn test_from_config_withSourceDriver_shouldReportDriver() -> Result<()> {
    let config = SplitConfig {
        driver: Language::Source,
        ..SplitConfig::default()
    };
    assert_eq!(SentenceSplitter::from_config(&config)?.driver(), Language::Source);
    Ok(())
}
