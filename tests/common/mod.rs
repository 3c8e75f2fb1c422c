/*!
 * Common test utilities for the subator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subator::app_config::{Config, TranslationConfig};
use subator::Word;

/// Routes library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Two short English sentences and their translations; each pair fits in one fragment
pub fn sample_pairs() -> (Vec<&'static str>, Vec<&'static str>) {
    (
        vec!["Hello everyone.", "Today we talk about chips."],
        vec!["大家好。", "今天我们聊聊芯片。"],
    )
}

/// Transcript words of `sample_pairs`, with one missing end
pub fn sample_words() -> Vec<Word> {
    vec![
        Word::new("Hello", Some(0.0), Some(0.4)),
        Word::new("everyone.", Some(0.4), Some(1.0)),
        Word::new("Today", Some(1.5), Some(1.8)),
        Word::new("we", Some(1.8), Some(2.0)),
        Word::new("talk", Some(2.0), None),
        Word::new("about", Some(2.3), Some(2.6)),
        Word::new("chips.", Some(2.6), Some(3.2)),
    ]
}

/// Transcript JSON in the aligned shape written by the transcriber
pub fn sample_transcript_json() -> String {
    let words = serde_json::to_string(&sample_words()).unwrap_or_else(|_| "[]".to_string());
    format!(r#"{{"segments": [], "word_segments": {}}}"#, words)
}

/// Translation settings that retry once without waiting
pub fn fast_translation_config() -> TranslationConfig {
    TranslationConfig {
        api_key: "test-key".to_string(),
        retry_count: 1,
        retry_backoff_ms: 0,
        concurrent_requests: 4,
        ..TranslationConfig::default()
    }
}

/// Default configuration with `fast_translation_config`
pub fn test_config() -> Config {
    Config {
        translation: fast_translation_config(),
        ..Config::default()
    }
}
