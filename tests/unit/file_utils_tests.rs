/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;
use subator::file_utils::{FileManager, ProjectLayout};
use subator::language::Language;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "en.txt", "Hello.\n")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_read_parallel_lines_withMatchingFiles_shouldPairLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (sources, targets) = common::sample_pairs();
    let en = temp_dir.path().join("en.txt");
    let ch = temp_dir.path().join("ch.txt");
    FileManager::write_lines(&en, &sources)?;
    // Blank lines between sentences are ignored
    common::create_test_file(temp_dir.path(), "ch.txt", &format!("{}\n\n{}\n", targets[0], targets[1]))?;

    let (en_lines, ch_lines) = FileManager::read_parallel_lines(&en, &ch)?;
    assert_eq!(en_lines, sources);
    assert_eq!(ch_lines, targets);
    Ok(())
}

#[test]
fn test_read_to_string_withMissingFile_shouldNameThePath() {
    let err = FileManager::read_to_string("/nonexistent/en.txt").unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/en.txt"));
}

#[test]
fn test_sanitize_component_shouldKeepCjkLetters() {
    assert_eq!(FileManager::sanitize_component("芯片 / Chips #1"), "芯片Chips1");
}

#[test]
fn test_project_layout_shouldPlaceIntermediatesUnderResources() {
    let layout = ProjectLayout::new("/videos/TT/Chips");

    assert_eq!(layout.resources(), Path::new("/videos/TT/Chips/resources"));
    assert_eq!(layout.sentences(Language::Target), Path::new("/videos/TT/Chips/resources/ch.txt"));
    assert_eq!(layout.fragments(), Path::new("/videos/TT/Chips/resources/fragments.json"));
    assert_eq!(layout.review_log(), Path::new("/videos/TT/Chips/resources/review.log"));
    assert_eq!(layout.subtitle("en"), Path::new("/videos/TT/Chips/en.srt"));
}
