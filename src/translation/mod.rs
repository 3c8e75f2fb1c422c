/*!
 * Sentence translation through an LLM provider.
 *
 * - `core`: single-sentence `Translator` with review checks and bounded retry
 * - `batch`: concurrent translation of a sentence list, reassembled in input order
 * - `prompts`: prompt templates and the prompt builder
 */

pub use self::batch::{BatchOutcome, BatchTranslator};
pub use self::core::{translation_ratio, LogEntry, ReviewFlag, SentenceTranslation, TokenUsageStats, Translator};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

pub mod batch;
pub mod core;
pub mod prompts;
