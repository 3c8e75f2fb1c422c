use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::alignment;
use crate::app_config::Config;
use crate::file_utils::{FileManager, ProjectLayout};
use crate::language::Language;
use crate::media::{self, MediaTools};
use crate::providers::openai::OpenAI;
use crate::providers::{CompletionRequest, Provider};
use crate::sentences::SentenceBuilder;
use crate::splitting::{FragmentDocument, SentenceSplitter};
use crate::subtitle_processor::{SubtitleEmitter, SubtitleTracks};
use crate::translation::{BatchOutcome, BatchTranslator, LogEntry, Translator};

// @module: Stage orchestration from download to subtitle files

/// Runs the pipeline stages, alone or in sequence
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a controller; the configuration is validated first
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full pipeline for one video: download, transcribe, build sentences, translate, split,
    /// align. With `pause_for_review` the run waits for Enter after each stage whose output
    /// is worth checking by hand.
    pub async fn run(&self, url: &str, save_dir: &Path, pause_for_review: bool) -> Result<ProjectLayout> {
        let start_time = Instant::now();
        let tools = MediaTools::new(self.config.media.clone());

        let info = tools.video_info(url).await?;
        let layout = ProjectLayout::for_video(save_dir, &info.author, &info.title);
        info!("Saving resources to {:?}", layout.resources());

        let downloaded = tools.download(url, &layout).await?;
        let transcript = tools.transcribe(&downloaded.audio, &layout).await?;

        let source_path = layout.sentences(Language::Source);
        let target_path = layout.sentences(Language::Target);
        self.build_sentences(&transcript, &source_path)?;
        if pause_for_review {
            wait_for_review(&format!("Sentences written to {:?}, please check the transcription.", source_path)).await?;
        }

        self.translate_file(&source_path, &target_path, &layout.review_log()).await?;
        if pause_for_review {
            wait_for_review(&format!(
                "Translation written to {:?}. Lines needing review are listed in {:?}.",
                target_path,
                layout.review_log()
            ))
            .await?;
        }

        self.split_files(&source_path, &target_path, &layout.fragments())?;
        if pause_for_review {
            wait_for_review(&format!("Fragments written to {:?}, fix any fragment by hand now.", layout.fragments())).await?;
        }

        self.align_files(&layout.fragments(), &transcript, layout.root())?;
        info!(
            "Subtitles saved to {:?} in {}",
            layout.root(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(layout)
    }

    /// Transcript words to one source sentence per line
    pub fn build_sentences(&self, transcript: &Path, output: &Path) -> Result<Vec<String>> {
        let words = media::load_words(transcript)?;
        let lines = SentenceBuilder::from_config(&self.config.sentences).build(&words);
        FileManager::write_lines(output, &lines)?;
        info!("Wrote {} sentences to {:?}", lines.len(), output);
        Ok(lines)
    }

    /// Translate a sentence file with the configured provider
    pub async fn translate_file(&self, input: &Path, output: &Path, review_log: &Path) -> Result<BatchOutcome> {
        self.config.validate_for_translation()?;
        let provider = OpenAI::from_config(&self.config.translation);
        if let Err(e) = provider.test_connection().await {
            warn!("Connection test to {} failed: {}", self.config.translation.provider.display_name(), e);
        }

        let sentences = FileManager::read_lines(input)?;
        let outcome = self.translate_with(provider, &sentences, review_log).await?;
        FileManager::write_lines(output, &outcome.texts())?;
        info!("Wrote {} translations to {:?}", sentences.len(), output);
        Ok(outcome)
    }

    /// Translate `sentences` through `provider`, logging review notes to `review_log`
    pub async fn translate_with<P>(&self, provider: P, sentences: &[String], review_log: &Path) -> Result<BatchOutcome>
    where
        P: Provider<Request = CompletionRequest>,
    {
        let config = &self.config.translation;
        info!("Translating {} sentences with {} - {}", sentences.len(), config.provider.display_name(), config.get_model());

        let progress_bar = ProgressBar::new(sentences.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sentences ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("#>-"));

        let batch = BatchTranslator::new(Translator::new(provider, config), config.concurrent_requests);
        let log_capture = Arc::new(Mutex::new(Vec::new()));
        let outcome = batch
            .translate_all(sentences, log_capture.clone(), |current, _| progress_bar.set_position(current as u64))
            .await;
        progress_bar.finish_and_clear();

        let logs = log_capture.lock().clone();
        Self::write_review_log(&outcome, &logs, review_log)?;
        info!("{}", outcome.token_stats.summary());
        Ok(outcome)
    }

    /// Parallel sentence files to the fragment document
    pub fn split_files(&self, source_path: &Path, target_path: &Path, output: &Path) -> Result<FragmentDocument> {
        let (sources, targets) = FileManager::read_parallel_lines(source_path, target_path)?;
        let splitter = SentenceSplitter::from_config(&self.config.split)?;
        info!("Splitting {} sentence pairs, {} drives", sources.len(), splitter.driver());

        let document = splitter
            .split_document(&sources, &targets)
            .with_context(|| format!("Splitting failed; fix the line in {:?} or {:?} and rerun", source_path, target_path))?;
        FileManager::write_to_file(output, &document.to_json()?)?;
        info!("Wrote {} fragments to {:?}", document.fragment_count(), output);
        Ok(document)
    }

    /// Fragment document plus transcript to subtitle files in `output_dir`
    pub fn align_files(&self, fragments_path: &Path, transcript: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let document = FragmentDocument::from_json(&FileManager::read_to_string(fragments_path)?)?;
        let words = media::load_words(transcript)?;

        let timed = alignment::align(&document, &words, self.config.alignment.fallback_word_duration_secs)
            .with_context(|| format!("Alignment failed; fix the fragment in {:?} and rerun", fragments_path))?;

        let emitter = SubtitleEmitter::new(
            self.config.split.profile(Language::Source)?,
            self.config.alignment.bilingual_track,
        );
        Self::write_tracks(&emitter.emit(&timed), output_dir)
    }

    fn write_tracks(tracks: &SubtitleTracks, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let layout = ProjectLayout::new(output_dir);
        let mut written = Vec::new();
        for track in tracks.iter() {
            let path = layout.subtitle(&track.name);
            track.write_to_srt(&path)?;
            info!("Wrote {} cues to {:?}", track.entries.len(), path);
            written.push(path);
        }
        Ok(written)
    }

    /// Append the review notes and captured log entries of a translation run
    fn write_review_log(outcome: &BatchOutcome, logs: &[LogEntry], path: &Path) -> Result<()> {
        let notes = outcome.review_notes();
        if notes.is_empty() {
            return Ok(());
        }
        warn!("{} translation(s) need review, see {:?}", notes.len(), path);

        for note in &notes {
            FileManager::append_to_log_file(path, &format!("Please check the response. {}", note))?;
        }
        for entry in logs.iter().filter(|e| e.level != "info") {
            FileManager::append_to_log_file(path, &format!("[{}] {}", entry.level, entry.message))?;
        }
        Ok(())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Block until the operator presses Enter
async fn wait_for_review(message: &str) -> Result<()> {
    eprintln!("{}\nPress Enter to continue...", message);
    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Err(anyhow!("stdin closed while waiting for review"));
    }
    Ok(())
}
