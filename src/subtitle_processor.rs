use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::alignment::TimedFragment;
use crate::language::{Language, LanguageProfile};

// @module: Subtitle cue building and SRT output

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number, starting at 1
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Entry from an interval in seconds
    pub fn from_seconds(seq_num: usize, start: f64, end: f64, text: String) -> Self {
        Self::new(seq_num, seconds_to_ms(start), seconds_to_ms(end), text)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// One output track
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    /// Track name used in file names, e.g. `en`, `ch`, `bilingual`
    pub name: String,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    pub fn new(name: impl Into<String>) -> Self {
        SubtitleCollection {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append a cue, numbering it after the last one
    pub fn push(&mut self, start: f64, end: f64, text: String) {
        let seq_num = self.entries.len() + 1;
        self.entries.push(SubtitleEntry::from_seconds(seq_num, start, end, text));
    }

    /// SRT text of the whole track
    pub fn to_srt(&self) -> String {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            write!(writer, "{}", entry)?;
        }
        writer.flush()?;

        debug!("Wrote {} cues to {}", self.entries.len(), path.display());
        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Track: {}", self.name)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// The tracks produced from one aligned document
#[derive(Debug, Clone)]
pub struct SubtitleTracks {
    pub source: SubtitleCollection,
    pub target: SubtitleCollection,
    pub bilingual: Option<SubtitleCollection>,
}

impl SubtitleTracks {
    pub fn iter(&self) -> impl Iterator<Item = &SubtitleCollection> {
        [&self.source, &self.target].into_iter().chain(self.bilingual.as_ref())
    }
}

/// Turns timed fragments into subtitle tracks
#[derive(Debug, Clone)]
pub struct SubtitleEmitter {
    /// Display cleaning for the source track
    source_profile: LanguageProfile,
    bilingual: bool,
}

impl SubtitleEmitter {
    pub fn new(source_profile: LanguageProfile, bilingual: bool) -> Self {
        Self {
            source_profile,
            bilingual,
        }
    }

    /// One source cue per source sub-fragment, one target cue per fragment, and optionally a
    /// bilingual cue per fragment sharing the target interval
    pub fn emit(&self, fragments: &[TimedFragment]) -> SubtitleTracks {
        let mut source = SubtitleCollection::new(Language::Source.tag());
        let mut target = SubtitleCollection::new(Language::Target.tag());
        let mut bilingual = self.bilingual.then(|| SubtitleCollection::new("bilingual"));

        for fragment in fragments {
            let mut source_texts = Vec::with_capacity(fragment.source.len());
            for sub in &fragment.source {
                let text = self.source_profile.clean_for_display(&sub.text);
                source.push(sub.start, sub.end, text.clone());
                source_texts.push(text);
            }
            target.push(fragment.start, fragment.end, fragment.target.clone());
            if let Some(track) = bilingual.as_mut() {
                track.push(
                    fragment.start,
                    fragment.end,
                    format!("{}\n{}", fragment.target, source_texts.join(" ")),
                );
            }
        }

        SubtitleTracks {
            source,
            target,
            bilingual,
        }
    }
}
