/*!
 * Tests for sentence translation with the mock provider
 */

use std::sync::Arc;

use parking_lot::Mutex;
use subator::providers::mock::MockProvider;
use subator::providers::CompletionRequest;
use subator::translation::{BatchTranslator, ReviewFlag, Translator};

use crate::common;

fn translator(provider: MockProvider) -> Translator<MockProvider> {
    Translator::new(provider, &common::fast_translation_config())
}

fn verbose_answer(_: &CompletionRequest) -> String {
    "这是一个远远超出预期长度的冗长回答".to_string()
}

#[test]
fn test_build_prompt_shouldCarryPersonaAndContext() {
    let mut config = common::fast_translation_config();
    config.persona = "你是一名芯片专家。".to_string();
    let translator = Translator::new(MockProvider::working(), &config);

    let prompt = translator.build_prompt("Memory is the bottleneck.", &["We tested the chip."]);
    assert!(prompt.contains("你是一名芯片专家。"));
    assert!(!prompt.contains("专家。。"));
    assert!(prompt.contains("这是前文，翻译结果中不要包含它的翻译：We tested the chip.。"));
    assert!(prompt.ends_with("：Memory is the bottleneck."));

    let first = translator.build_prompt::<&str>("Hello.", &[]);
    assert!(!first.contains("这是前文"));
}

#[tokio::test]
async fn test_translate_withWorkingProvider_shouldReturnAnswer() {
    let translator = translator(MockProvider::working());
    let result = translator.translate::<&str>(0, "Hello big world", &[]).await;

    assert_eq!(result.text, "Hbw");
    assert_eq!(result.attempts, 1);
    assert!(!result.needs_review());
    assert!(result.usage.is_some());
}

#[tokio::test]
async fn test_translate_withFailingProvider_shouldUseMarkerAfterRetries() {
    let provider = MockProvider::failing();
    let translator = translator(provider.clone());
    let result = translator.translate::<&str>(4, "Hello world", &[]).await;

    assert_eq!(result.text, "[untranslated]");
    assert_eq!(result.attempts, 2);
    assert_eq!(provider.request_count(), 2);
    assert!(result.is_untranslated());
}

#[tokio::test]
async fn test_translate_withUnauthorizedProvider_shouldNotRetry() {
    let provider = MockProvider::unauthorized();
    let result = translator(provider.clone()).translate::<&str>(0, "Hello world", &[]).await;

    assert_eq!(result.attempts, 1);
    assert_eq!(provider.request_count(), 1);
    assert!(result.is_untranslated());
}

#[tokio::test]
async fn test_translate_withEmptyAnswers_shouldRetryThenGiveUp() {
    let provider = MockProvider::empty();
    let result = translator(provider.clone()).translate::<&str>(0, "Hello world", &[]).await;

    assert_eq!(provider.request_count(), 2);
    assert!(result.is_untranslated());
}

#[tokio::test]
async fn test_translate_withSuspiciousAnswers_shouldFlagForReview() {
    let result = translator(MockProvider::multi_line())
        .translate::<&str>(0, "one two three four five six seven eight", &[])
        .await;
    assert_eq!(result.flags, vec![ReviewFlag::MultiLine]);
    assert!(!result.is_untranslated());

    let result = translator(MockProvider::working().with_custom_response(verbose_answer))
        .translate::<&str>(0, "Short one", &[])
        .await;
    assert!(matches!(result.flags.as_slice(), [ReviewFlag::RatioExceeded { .. }]));
    assert_eq!(result.text, verbose_answer(&CompletionRequest::new("m", "p")));
}

#[tokio::test]
async fn test_translate_withBlankSentence_shouldSkipProvider() {
    let provider = MockProvider::working();
    let result = translator(provider.clone()).translate::<&str>(0, "   ", &[]).await;

    assert_eq!(result.text, "");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_all_withSlowProvider_shouldKeepOrder() {
    let sentences: Vec<String> = (0..6).map(|i| format!("Line {} here", i)).collect();
    let batch = BatchTranslator::new(translator(MockProvider::slow(20)), 3);
    let outcome = batch.translate_all(&sentences, Arc::new(Mutex::new(Vec::new())), |_, _| {}).await;

    assert_eq!(outcome.texts(), vec!["L0h", "L1h", "L2h", "L3h", "L4h", "L5h"]);
    assert_eq!(outcome.token_stats.requests, 6);
    assert!(outcome.token_stats.summary().contains("Prompt tokens: "));
}
