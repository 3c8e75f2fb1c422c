/*!
 * Integration tests for the split, align and emit stages
 */

use anyhow::Result;
use subator::app_controller::Controller;
use subator::file_utils::{FileManager, ProjectLayout};
use subator::language::Language;

use crate::common;

/// Writes the sample sentence files and transcript into `layout`
fn prepare(layout: &ProjectLayout) -> Result<std::path::PathBuf> {
    let (sources, targets) = common::sample_pairs();
    FileManager::write_lines(layout.sentences(Language::Source), &sources)?;
    FileManager::write_lines(layout.sentences(Language::Target), &targets)?;
    let transcript = layout.stream("audio", "json");
    FileManager::write_to_file(&transcript, &common::sample_transcript_json())?;
    Ok(transcript)
}

#[test]
fn test_subtitle_workflow_withSamplePairs_shouldWriteThreeTracks() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let layout = ProjectLayout::new(temp_dir.path());
    let transcript = prepare(&layout)?;
    let controller = Controller::with_config(common::test_config())?;

    let document = controller.split_files(
        &layout.sentences(Language::Source),
        &layout.sentences(Language::Target),
        &layout.fragments(),
    )?;
    assert_eq!(document.fragment_count(), 2);
    assert!(FileManager::file_exists(layout.fragments()));

    let written = controller.align_files(&layout.fragments(), &transcript, layout.root())?;
    assert_eq!(written, vec![layout.subtitle("en"), layout.subtitle("ch"), layout.subtitle("bilingual")]);

    let en = FileManager::read_to_string(layout.subtitle("en"))?;
    assert_eq!(
        en,
        "1\n00:00:00,000 --> 00:00:01,000\nHello everyone.\n\n\
         2\n00:00:01,500 --> 00:00:03,200\nToday we talk about chips.\n\n"
    );
    let ch = FileManager::read_to_string(layout.subtitle("ch"))?;
    assert!(ch.contains("00:00:01,500 --> 00:00:03,200\n今天我们聊聊芯片\n"));
    let bilingual = FileManager::read_to_string(layout.subtitle("bilingual"))?;
    assert!(bilingual.contains("1\n00:00:00,000 --> 00:00:01,000\n大家好\nHello everyone.\n"));
    Ok(())
}

#[test]
fn test_subtitle_workflow_withHandEditedFragments_shouldUseEdits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = ProjectLayout::new(temp_dir.path());
    let transcript = prepare(&layout)?;
    let mut config = common::test_config();
    config.alignment.bilingual_track = false;
    let controller = Controller::with_config(config)?;

    let mut document = controller.split_files(
        &layout.sentences(Language::Source),
        &layout.sentences(Language::Target),
        &layout.fragments(),
    )?;
    // The operator moves "talk about chips." into its own sub-fragment
    document.sentences[1].fragments[0].source = vec!["Today we".to_string(), "talk about chips.".to_string()];
    FileManager::write_to_file(layout.fragments(), &document.to_json()?)?;

    let written = controller.align_files(&layout.fragments(), &transcript, layout.root())?;
    assert_eq!(written.len(), 2);
    let en = FileManager::read_to_string(layout.subtitle("en"))?;
    assert!(en.contains("2\n00:00:01,500 --> 00:00:02,000\nToday we\n"));
    assert!(en.contains("3\n00:00:02,000 --> 00:00:03,200\ntalk about chips.\n"));
    assert!(!FileManager::file_exists(layout.subtitle("bilingual")));
    Ok(())
}

#[test]
fn test_subtitle_workflow_withWrongTranscript_shouldStopBeforeWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = ProjectLayout::new(temp_dir.path());
    prepare(&layout)?;
    let transcript = common::create_test_file(
        temp_dir.path(),
        "other.json",
        r#"[{"word": "Hello", "start": 0.0, "end": 0.4}, {"word": "everybody.", "start": 0.4, "end": 1.0}]"#,
    )?;
    let controller = Controller::with_config(common::test_config())?;
    controller.split_files(
        &layout.sentences(Language::Source),
        &layout.sentences(Language::Target),
        &layout.fragments(),
    )?;

    let err = controller.align_files(&layout.fragments(), &transcript, layout.root()).unwrap_err();
    assert!(format!("{:#}", err).contains("sentence 1: "));
    assert!(!FileManager::file_exists(layout.subtitle("en")));
    Ok(())
}

#[test]
fn test_subtitle_workflow_withUnevenFiles_shouldRefuseToSplit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = ProjectLayout::new(temp_dir.path());
    prepare(&layout)?;
    FileManager::write_lines(layout.sentences(Language::Target), &["大家好。"])?;

    let controller = Controller::with_config(common::test_config())?;
    let result = controller.split_files(
        &layout.sentences(Language::Source),
        &layout.sentences(Language::Target),
        &layout.fragments(),
    );
    assert!(result.is_err());
    assert!(!FileManager::file_exists(layout.fragments()));
    Ok(())
}

#[test]
fn test_build_sentences_shouldWriteSourceFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = ProjectLayout::new(temp_dir.path());
    let transcript = prepare(&layout)?;
    let mut config = common::test_config();
    config.sentences.max_line_length = 20;

    let lines = Controller::with_config(config)?.build_sentences(&transcript, &layout.sentences(Language::Source))?;
    assert_eq!(lines, common::sample_pairs().0);
    assert_eq!(FileManager::read_lines(layout.sentences(Language::Source))?, lines);
    Ok(())
}
