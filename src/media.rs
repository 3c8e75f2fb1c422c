/*!
 * External media tools.
 *
 * Downloading uses `yt-dlp` and transcription uses `whisperx`; both run as child processes. The
 * transcript they leave behind is a JSON word list which `load_words` turns into `Word`s.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::alignment::Word;
use crate::app_config::MediaConfig;
use crate::errors::AppError;
use crate::file_utils::{FileManager, ProjectLayout};

/// Metadata used to name the output directories
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub author: String,
    pub title: String,
}

#[derive(Deserialize)]
struct DownloaderMetadata {
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl VideoInfo {
    /// Parse the downloader's JSON metadata; the uploader wins over the channel name
    pub fn from_json(json: &str) -> Result<Self> {
        let metadata: DownloaderMetadata = serde_json::from_str(json).context("Failed to parse video metadata")?;
        Ok(Self {
            author: metadata.uploader.or(metadata.channel).unwrap_or_else(|| "unknown".to_string()),
            title: metadata.title.unwrap_or_else(|| "untitled".to_string()),
        })
    }
}

/// Paths of the downloaded streams
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedMedia {
    pub audio: PathBuf,
    pub video: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptJson {
    Aligned { word_segments: Vec<Word> },
    Flat(Vec<Word>),
}

/// Parse a transcript: either whisperx output with `word_segments` or a plain word array.
/// Words that are empty after trimming are dropped.
pub fn parse_words(json: &str) -> Result<Vec<Word>> {
    let transcript: TranscriptJson = serde_json::from_str(json).context("Transcript is neither a word list nor has word_segments")?;
    let words = match transcript {
        TranscriptJson::Aligned { word_segments } => word_segments,
        TranscriptJson::Flat(words) => words,
    };

    let total = words.len();
    let words: Vec<Word> = words
        .into_iter()
        .filter(|w| !w.is_blank())
        .map(|w| Word::new(w.word.trim(), w.start, w.end))
        .collect();
    if words.len() < total {
        debug!("Dropped {} empty words from the transcript", total - words.len());
    }
    Ok(words)
}

pub fn load_words<P: AsRef<Path>>(path: P) -> Result<Vec<Word>> {
    let json = FileManager::read_to_string(&path)?;
    parse_words(&json).with_context(|| format!("Failed to load transcript {:?}", path.as_ref()))
}

/// Runs the downloader and the transcriber
#[derive(Debug, Clone)]
pub struct MediaTools {
    config: MediaConfig,
}

impl MediaTools {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Author and title of the video at `url`
    pub async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        let args = vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ];
        let output = run_tool(&self.config.downloader, &args).await?;
        let info = VideoInfo::from_json(&output)?;
        info!("Video: '{}' by '{}'", info.title, info.author);
        Ok(info)
    }

    /// Download the audio stream, and the video stream when configured, into the resources
    /// directory. Streams already present are not downloaded again.
    pub async fn download(&self, url: &str, layout: &ProjectLayout) -> Result<DownloadedMedia> {
        FileManager::ensure_dir(layout.resources())?;
        let audio = self.download_stream(url, layout, "audio", &self.config.audio_format).await?;
        let video = if self.config.download_video {
            Some(self.download_stream(url, layout, "video", &self.config.video_format).await?)
        } else {
            None
        };
        Ok(DownloadedMedia { audio, video })
    }

    async fn download_stream(&self, url: &str, layout: &ProjectLayout, kind: &str, format: &str) -> Result<PathBuf> {
        if let Some(existing) = find_stream(&layout.resources(), kind)? {
            info!("Stream already exists at {:?}", existing);
            return Ok(existing);
        }

        info!("Downloading the {} stream to {:?}", kind, layout.resources());
        run_tool(&self.config.downloader, &self.download_args(url, layout, kind, format)).await?;
        find_stream(&layout.resources(), kind)?
            .ok_or_else(|| AppError::Tool(format!("{} finished without writing the {} stream", self.config.downloader, kind)).into())
    }

    pub fn download_args(&self, url: &str, layout: &ProjectLayout, kind: &str, format: &str) -> Vec<String> {
        let template = layout.stream(kind, "%(ext)s");
        vec![
            "-f".to_string(),
            format.to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            url.to_string(),
        ]
    }

    /// Transcribe `audio` into the resources directory and return the transcript path.
    /// An existing transcript is reused.
    pub async fn transcribe(&self, audio: &Path, layout: &ProjectLayout) -> Result<PathBuf> {
        let transcript = layout.transcript_for(audio);
        if FileManager::file_exists(&transcript) {
            info!("Transcript already exists at {:?}", transcript);
            return Ok(transcript);
        }

        info!("Transcribing {:?} with {}", audio, self.config.transcribe_model);
        run_tool(&self.config.transcriber, &self.transcribe_args(audio, &layout.resources())).await?;
        if !FileManager::file_exists(&transcript) {
            return Err(AppError::Tool(format!("{} did not write {:?}", self.config.transcriber, transcript)).into());
        }
        Ok(transcript)
    }

    pub fn transcribe_args(&self, audio: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio.to_string_lossy().into_owned(),
            "--model".to_string(),
            self.config.transcribe_model.clone(),
            "--language".to_string(),
            self.config.transcribe_language.clone(),
            "--align_model".to_string(),
            self.config.align_model.clone(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
            "--output_format".to_string(),
            "json".to_string(),
            "--print_progress".to_string(),
            "True".to_string(),
        ];
        if let Some(model_dir) = &self.config.model_dir {
            args.push("--model_dir".to_string());
            args.push(model_dir.clone());
        }
        args
    }
}

/// A file named `<kind>.<ext>` in `dir`, ignoring transcripts
fn find_stream(dir: &Path, kind: &str) -> Result<Option<PathBuf>> {
    if !FileManager::dir_exists(dir) {
        return Ok(None);
    }
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        let stem_matches = path.file_stem().is_some_and(|s| s == kind);
        let is_media = path
            .extension()
            .is_some_and(|e| e != "json" && e != "part" && e != "txt");
        if path.is_file() && stem_matches && is_media {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Run an external tool and return its stdout
async fn run_tool(program: &str, args: &[String]) -> Result<String> {
    debug!("Running {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| AppError::Tool(format!("Failed to start {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Tool(format!("{} exited with {}: {}", program, output.status, stderr.trim())).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
