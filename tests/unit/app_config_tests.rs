/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use subator::app_config::{Config, MergePolicy, ParserKind, TranslationProvider};
use subator::language::Language;

#[test]
fn test_config_withEmptyJson_shouldUseDefaults() -> Result<()> {
    let config: Config = serde_json::from_str("{}")?;

    assert_eq!(config.split.driver, Language::Target);
    assert_eq!(config.split.max_target_spans, 15);
    assert_eq!(config.split.max_source_spans, 20);
    assert_eq!(config.alignment.fallback_word_duration_secs, 0.5);
    assert!(config.alignment.bilingual_track);
    assert_eq!(config.translation.provider, TranslationProvider::Zhipu);
    config.validate()?;
    Ok(())
}

#[test]
fn test_config_serializedDefault_shouldLoadBack() -> Result<()> {
    let json = serde_json::to_string_pretty(&Config::default())?;
    let config: Config = serde_json::from_str(&json)?;

    assert_eq!(config.split.merge_policy, MergePolicy::default());
    assert_eq!(config.split.parser.kind, ParserKind::default());
    assert_eq!(config.translation.get_model(), "glm-4");
    Ok(())
}

#[test]
fn test_validate_withBrokenPresplitPattern_shouldFail() {
    let mut config = Config::default();
    config.split.target_presplit_pattern = "([。".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("pre-split pattern"));
}

#[test]
fn test_validate_withCommandParserWithoutCommands_shouldFail() {
    let mut config = Config::default();
    config.split.parser.kind = ParserKind::Command;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withSingleSpanCap_shouldFail() {
    let mut config = Config::default();
    config.split.max_source_spans = 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_for_translation_shouldRequireApiKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Qwen;
    let err = config.validate_for_translation().unwrap_err();
    assert_eq!(err.to_string(), "Translation API key is required for the Qwen provider");

    config.translation.api_key = "sk-test".to_string();
    assert!(config.validate_for_translation().is_ok());
}

#[test]
fn test_provider_fromStr_shouldAcceptAliases() -> Result<()> {
    assert_eq!("glm".parse::<TranslationProvider>()?, TranslationProvider::Zhipu);
    assert_eq!("OpenAI".parse::<TranslationProvider>()?, TranslationProvider::OpenAI);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    Ok(())
}
