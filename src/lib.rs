/*!
 * # subator - bilingual subtitles for English videos
 *
 * A Rust library that turns an English video into English, Chinese and bilingual SRT subtitles.
 *
 * ## Features
 *
 * - Download the audio stream and transcribe it with word-level timestamps
 * - Build one English sentence per line from the transcript
 * - Translate sentence by sentence through an OpenAI-compatible chat API, with a sliding
 *   context window and review flags for suspicious answers
 * - Split every sentence pair into subtitle-sized fragments that stay paired across languages
 * - Time the fragments from the transcript and emit the subtitle tracks
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `language`: Source/target languages and their length metrics
 * - `segmentation`: Dependency parses and labelled spans
 * - `splitting`: Paired fragment splitting:
 *   - `splitting::length_bound`: Span merging under a length cap
 *   - `splitting::ratio`: Length-ratio partitioning of the other language
 *   - `splitting::pipeline`: Per-sentence pipeline and the fragment document
 * - `alignment`: Timing fragments from transcript words
 * - `subtitle_processor`: SRT entries and track emission
 * - `sentences`: Transcript words to sentence lines
 * - `translation`: Sentence translation:
 *   - `translation::core`: Single sentence translation with retries and review flags
 *   - `translation::batch`: Concurrent translation of a whole file
 *   - `translation::prompts`: Prompt templates
 * - `providers`: Chat completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted provider for tests
 * - `media`: Downloader and transcriber processes
 * - `file_utils`: File system operations and the project layout
 * - `app_controller`: Stage orchestration
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language;
pub mod media;
pub mod providers;
pub mod segmentation;
pub mod sentences;
pub mod splitting;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use alignment::{align, TimedFragment, Word};
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ParserError, ProviderError, SplitError, TranslationError};
pub use language::{Language, LanguageProfile};
pub use splitting::{Fragment, FragmentDocument, SentenceSplitter};
pub use subtitle_processor::{SubtitleCollection, SubtitleEmitter, SubtitleEntry, SubtitleTracks};
pub use translation::{BatchTranslator, Translator};
