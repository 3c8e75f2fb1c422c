use anyhow::{anyhow, Context, Result};
use chrono::Local;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::language::Language;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Read a one-sentence-per-line file; lines are trimmed and blank lines skipped
    pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let content = Self::read_to_string(&path)?;
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        debug!("Read {} lines from {:?}", lines.len(), path.as_ref());
        Ok(lines)
    }

    /// Write one entry per line, newline-terminated
    pub fn write_lines<P: AsRef<Path>, S: AsRef<str>>(path: P, lines: &[S]) -> Result<()> {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        Self::write_to_file(path, &content)
    }

    /// Read the two parallel sentence files and check they have the same number of lines
    pub fn read_parallel_lines<P1: AsRef<Path>, P2: AsRef<Path>>(
        source_path: P1,
        target_path: P2,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let source = Self::read_lines(&source_path)?;
        let target = Self::read_lines(&target_path)?;
        if source.len() != target.len() {
            return Err(anyhow!(
                "{:?} has {} lines but {:?} has {}; every sentence needs exactly one translation",
                source_path.as_ref(),
                source.len(),
                target_path.as_ref(),
                target.len()
            ));
        }
        Ok((source, target))
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Keep only alphanumeric characters so that a title can be used as a directory name
    pub fn sanitize_component(name: &str) -> String {
        name.chars().filter(|c| c.is_alphanumeric()).collect()
    }
}

// @struct: Where each stage reads and writes its files
//
// `<root>/` holds the subtitle tracks, `<root>/resources/` the media and intermediate files.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// `<save_dir>/<author>/<title>` with both names reduced to alphanumerics
    pub fn for_video<P: AsRef<Path>>(save_dir: P, author: &str, title: &str) -> Self {
        Self::new(
            save_dir
                .as_ref()
                .join(FileManager::sanitize_component(author))
                .join(FileManager::sanitize_component(title)),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resources(&self) -> PathBuf {
        self.root.join("resources")
    }

    /// Downloaded stream, e.g. `resources/audio.webm`
    pub fn stream(&self, kind: &str, extension: &str) -> PathBuf {
        self.resources().join(format!("{}.{}", kind, extension))
    }

    /// Word-level transcript written by the transcriber for `audio_path`
    pub fn transcript_for(&self, audio_path: &Path) -> PathBuf {
        let stem = audio_path.file_stem().map_or_else(|| "audio".into(), |s| s.to_string_lossy());
        self.resources().join(format!("{}.json", stem))
    }

    /// One sentence per line: `en.txt` for the source, `ch.txt` for the target
    pub fn sentences(&self, language: Language) -> PathBuf {
        self.resources().join(format!("{}.txt", language.tag()))
    }

    pub fn fragments(&self) -> PathBuf {
        self.resources().join("fragments.json")
    }

    pub fn review_log(&self) -> PathBuf {
        self.resources().join("review.log")
    }

    /// Subtitle track, e.g. `en.srt`, `ch.srt`, `bilingual.srt`
    pub fn subtitle(&self, track: &str) -> PathBuf {
        self.root.join(format!("{}.srt", track))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_shouldTrimAndSkipBlankLines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.txt");
        FileManager::write_to_file(&path, "  First line. \n\nSecond line.\n").unwrap();
        assert_eq!(FileManager::read_lines(&path).unwrap(), vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_write_lines_shouldCreateParents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("ch.txt");
        FileManager::write_lines(&path, &["你好", "世界"]).unwrap();
        assert_eq!(FileManager::read_to_string(&path).unwrap(), "你好\n世界\n");
    }

    #[test]
    fn test_read_parallel_lines_withDifferentCounts_shouldFail() {
        let dir = tempfile::tempdir().unwrap();
        let en = dir.path().join("en.txt");
        let ch = dir.path().join("ch.txt");
        FileManager::write_lines(&en, &["One.", "Two."]).unwrap();
        FileManager::write_lines(&ch, &["一。"]).unwrap();
        let err = FileManager::read_parallel_lines(&en, &ch).unwrap_err();
        assert!(err.to_string().contains("2 lines"));
    }

    #[test]
    fn test_layout_shouldSanitizeAuthorAndTitle() {
        let layout = ProjectLayout::for_video("/tmp/out", "Tech Talks!", "Chips: the end?");
        assert_eq!(layout.root(), Path::new("/tmp/out/TechTalks/Chipstheend"));
        assert_eq!(layout.sentences(Language::Source), Path::new("/tmp/out/TechTalks/Chipstheend/resources/en.txt"));
        assert_eq!(layout.subtitle("bilingual"), Path::new("/tmp/out/TechTalks/Chipstheend/bilingual.srt"));
        assert_eq!(
            layout.transcript_for(&layout.stream("audio", "webm")),
            Path::new("/tmp/out/TechTalks/Chipstheend/resources/audio.json")
        );
    }

    #[test]
    fn test_append_to_log_file_shouldTimestampEntries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.log");
        FileManager::append_to_log_file(&path, "line 3: check").unwrap();
        FileManager::append_to_log_file(&path, "line 9: check").unwrap();
        let content = FileManager::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.starts_with('[')));
    }
}
