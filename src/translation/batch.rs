/*!
 * Concurrent translation of a whole sentence list.
 *
 * Sentences are independent requests. They run concurrently under a semaphore and are put back
 * in input order before anything downstream sees them.
 */

use futures::stream::{self, StreamExt};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::core::{LogEntry, SentenceTranslation, TokenUsageStats, Translator};
use crate::providers::{CompletionRequest, Provider};

/// Translations of a sentence list, in input order
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub translations: Vec<SentenceTranslation>,
    pub token_stats: TokenUsageStats,
}

impl BatchOutcome {
    /// One line per input sentence
    pub fn texts(&self) -> Vec<String> {
        self.translations.iter().map(|t| t.text.clone()).collect()
    }

    pub fn flagged(&self) -> impl Iterator<Item = &SentenceTranslation> {
        self.translations.iter().filter(|t| t.needs_review())
    }

    /// Human-readable review notes, one per flag
    pub fn review_notes(&self) -> Vec<String> {
        self.flagged()
            .flat_map(|t| {
                t.flags.iter().map(move |flag| {
                    format!("line {}: {}\n    source: {}\n    target: {}", t.index + 1, flag, t.source, t.text)
                })
            })
            .collect()
    }
}

/// Batch translator for processing all sentences of a transcript
#[derive(Debug)]
pub struct BatchTranslator<P> {
    translator: Translator<P>,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,
}

impl<P> BatchTranslator<P>
where
    P: Provider<Request = CompletionRequest>,
{
    pub fn new(translator: Translator<P>, max_concurrent_requests: usize) -> Self {
        Self {
            translator,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    pub fn translator(&self) -> &Translator<P> {
        &self.translator
    }

    /// Translate every sentence; the result has one entry per sentence in input order
    pub async fn translate_all<S, F>(
        &self,
        sentences: &[S],
        log_capture: Arc<Mutex<Vec<LogEntry>>>,
        progress_callback: F,
    ) -> BatchOutcome
    where
        S: AsRef<str> + Sync,
        F: Fn(usize, usize) + Sync,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let total = sentences.len();
        let processed = AtomicUsize::new(0);
        let translator = &self.translator;
        let processed = &processed;
        let progress_callback = &progress_callback;

        let mut translations = stream::iter(sentences.iter().enumerate())
            .map(|(index, sentence)| {
                let semaphore = semaphore.clone();
                let log_capture = log_capture.clone();

                async move {
                    let _permit = semaphore.acquire().await.ok();
                    let context = translator.context_window(sentences, index);
                    let result = translator.translate(index, sentence.as_ref(), context).await;

                    let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total);

                    let mut logs = log_capture.lock();
                    for flag in &result.flags {
                        logs.push(LogEntry::new(
                            "warn",
                            format!("Sentence {} needs review: {}", index + 1, flag),
                        ));
                    }
                    result
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort by index to restore the input order
        translations.sort_by_key(|t| t.index);

        let mut token_stats = self.translator.new_token_stats();
        for translation in &translations {
            token_stats.record(translation);
        }

        let flagged = translations.iter().filter(|t| t.needs_review()).count();
        if flagged > 0 {
            warn!("{} of {} sentences need review", flagged, total);
        }
        info!(
            "Translated {} sentences with {} tokens",
            total, token_stats.total_tokens
        );
        log_capture.lock().push(LogEntry::new(
            "info",
            format!("Translated {} sentences, {} flagged for review", total, flagged),
        ));

        BatchOutcome {
            translations,
            token_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::TranslationConfig;
    use crate::providers::mock::MockProvider;

    fn batch(provider: MockProvider, concurrency: usize) -> BatchTranslator<MockProvider> {
        let config = TranslationConfig {
            retry_count: 1,
            retry_backoff_ms: 0,
            ..TranslationConfig::default()
        };
        BatchTranslator::new(Translator::new(provider, &config), concurrency)
    }

    #[tokio::test]
    async fn test_translate_all_shouldKeepInputOrder() {
        let sentences: Vec<String> = (0..20).map(|i| format!("Sentence number {}", i)).collect();
        let logs = Arc::new(Mutex::new(Vec::new()));
        let outcome = batch(MockProvider::working(), 8).translate_all(&sentences, logs, |_, _| {}).await;

        let indices: Vec<usize> = outcome.translations.iter().map(|t| t.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
        assert_eq!(outcome.texts()[7], "Sn7");
        assert_eq!(outcome.token_stats.requests, 20);
    }

    #[tokio::test]
    async fn test_translate_all_withFailures_shouldMarkAndContinue() {
        let sentences = vec!["First one", "Second one", "Third one"];
        let logs = Arc::new(Mutex::new(Vec::new()));
        let outcome = batch(MockProvider::failing(), 2).translate_all(&sentences, logs.clone(), |_, _| {}).await;

        assert_eq!(outcome.texts(), vec!["[untranslated]"; 3]);
        assert_eq!(outcome.flagged().count(), 3);
        assert_eq!(outcome.review_notes().len(), 3);
        let warnings = logs.lock().iter().filter(|e| e.level == "warn").count();
        assert_eq!(warnings, 3);
    }

    #[tokio::test]
    async fn test_translate_all_shouldReportProgress() {
        let sentences = vec!["a b", "c d", "e f"];
        let seen = AtomicUsize::new(0);
        let logs = Arc::new(Mutex::new(Vec::new()));
        batch(MockProvider::working(), 2)
            .translate_all(&sentences, logs, |current, total| {
                assert_eq!(total, 3);
                seen.fetch_max(current, Ordering::SeqCst);
            })
            .await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
