/*!
 * Integration tests for translating a sentence file through the controller
 */

use anyhow::Result;
use subator::app_controller::Controller;
use subator::file_utils::FileManager;
use subator::providers::mock::MockProvider;
use subator::providers::CompletionRequest;

use crate::common;

/// Answers every sentence mentioning "chips" with two lines
fn chatty_about_chips(request: &CompletionRequest) -> String {
    let sentence = MockProvider::sentence_of(request);
    if sentence.contains("chips") {
        "聊芯片\n（芯片）".to_string()
    } else {
        MockProvider::initials(sentence)
    }
}

#[tokio::test]
async fn test_translate_with_withWorkingProvider_shouldKeepLineCount() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let review_log = temp_dir.path().join("review.log");
    let sentences: Vec<String> = common::sample_pairs().0.into_iter().map(String::from).collect();
    let controller = Controller::with_config(common::test_config())?;

    let outcome = controller
        .translate_with(MockProvider::working(), &sentences, &review_log)
        .await?;

    assert_eq!(outcome.texts(), vec!["He", "Twtac"]);
    assert_eq!(outcome.flagged().count(), 0);
    assert!(!FileManager::file_exists(&review_log));
    Ok(())
}

#[tokio::test]
async fn test_translate_with_withSuspiciousAnswer_shouldWriteReviewLog() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let review_log = temp_dir.path().join("review.log");
    let sentences: Vec<String> = common::sample_pairs().0.into_iter().map(String::from).collect();
    let controller = Controller::with_config(common::test_config())?;

    let provider = MockProvider::working().with_custom_response(chatty_about_chips);
    let outcome = controller.translate_with(provider, &sentences, &review_log).await?;

    let flagged: Vec<usize> = outcome.flagged().map(|t| t.index).collect();
    assert_eq!(flagged, vec![1]);
    let log = FileManager::read_to_string(&review_log)?;
    assert!(log.contains("Please check the response. line 2: response contains multiple lines"));
    assert!(log.contains("source: Today we talk about chips."));
    Ok(())
}

#[tokio::test]
async fn test_translate_with_withMultiLineAnswers_shouldStillSplit() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let review_log = temp_dir.path().join("review.log");
    let en = temp_dir.path().join("en.txt");
    let ch = temp_dir.path().join("ch.txt");
    let sentences: Vec<String> = common::sample_pairs().0.into_iter().map(String::from).collect();
    FileManager::write_lines(&en, &sentences)?;
    let controller = Controller::with_config(common::test_config())?;

    let outcome = controller
        .translate_with(MockProvider::multi_line(), &sentences, &review_log)
        .await?;
    FileManager::write_lines(&ch, &outcome.texts())?;

    assert_eq!(outcome.flagged().count(), 2);
    assert_eq!(FileManager::read_lines(&ch)?.len(), sentences.len());
    let document = controller.split_files(&en, &ch, &temp_dir.path().join("fragments.json"))?;
    assert_eq!(document.sentences.len(), 2);
    assert!(document.sentences.iter().all(|s| !s.target.contains('\n')));
    Ok(())
}

#[tokio::test]
async fn test_translate_with_withFailingProvider_shouldMarkEveryLine() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let review_log = temp_dir.path().join("review.log");
    let output = temp_dir.path().join("ch.txt");
    let sentences: Vec<String> = common::sample_pairs().0.into_iter().map(String::from).collect();
    let controller = Controller::with_config(common::test_config())?;

    let outcome = controller
        .translate_with(MockProvider::failing(), &sentences, &review_log)
        .await?;
    FileManager::write_lines(&output, &outcome.texts())?;

    assert_eq!(FileManager::read_lines(&output)?, vec!["[untranslated]", "[untranslated]"]);
    assert!(outcome.translations.iter().all(|t| t.is_untranslated()));
    let log = FileManager::read_to_string(&review_log)?;
    assert!(log.contains("line 1: translation failed"));
    assert!(log.contains("[warn] Sentence 2 needs review"));
    Ok(())
}

#[test]
fn test_translate_file_withoutApiKey_shouldFailBeforeReading() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config();
    config.translation.api_key = String::new();
    let controller = Controller::with_config(config)?;

    let result = tokio_test::block_on(controller.translate_file(
        &temp_dir.path().join("missing.txt"),
        &temp_dir.path().join("ch.txt"),
        &temp_dir.path().join("review.log"),
    ));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("API key is required"));
    Ok(())
}
