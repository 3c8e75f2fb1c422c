/*!
 * Prompt construction for sentence translation.
 *
 * The prompt is a single user message: the translator instruction, an optional domain persona,
 * the preceding sentences as context that must not be translated, and the sentence itself.
 */

pub mod templates;

pub use templates::{PromptTemplate, TranslationPromptBuilder};
