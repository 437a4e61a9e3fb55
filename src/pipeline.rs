use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use std::time::Instant;

use crate::analyzer::LexicalNormalizer;
use crate::crawler::PageFetcher;
use crate::data_models::{ResultCount, TopKResult};
use crate::extractor::extract;
use crate::frequency::{TOP_K, aggregate};
use crate::lexicon::{DomainExclusions, StopWords};
use crate::morphology::MorphAnalyzer;
use crate::notice::Notifier;
use crate::search::{SearchProvider, discover};

/// search -> fetch -> extract -> normalize -> count, for one query at a time.
pub struct Pipeline {
    provider: Box<dyn SearchProvider>,
    fetcher: Box<dyn PageFetcher>,
    normalizer: LexicalNormalizer,
    notifier: Notifier,
}

impl Pipeline {
    pub fn new(
        provider: Box<dyn SearchProvider>,
        fetcher: Box<dyn PageFetcher>,
        morph: Arc<dyn MorphAnalyzer>,
        stop_words: StopWords,
        exclusions: DomainExclusions,
    ) -> Self {
        Self {
            provider,
            fetcher,
            normalizer: LexicalNormalizer::new(morph, stop_words, exclusions),
            notifier: Notifier::silent(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Extracted text of every address, in discoverer order.
    pub async fn collect_texts(&self, query: &str, num_results: ResultCount) -> Vec<String> {
        let addresses =
            discover(self.provider.as_ref(), query, num_results, &self.notifier).await;
        if addresses.is_empty() {
            return Vec::new();
        }

        // `buffered` yields in input order whatever order the fetches finish in
        stream::iter(addresses.iter())
            .map(|address| extract(self.fetcher.as_ref(), address, &self.notifier))
            .buffered(num_results.get())
            .collect()
            .await
    }

    /// Top lemmas for `query`. Never fails; a run where nothing could be
    /// fetched returns an empty result.
    pub async fn process_query(&self, query: &str, num_results: ResultCount) -> TopKResult {
        let start = Instant::now();
        let texts = self.collect_texts(query, num_results).await;
        let fetched = texts.iter().filter(|t| !t.is_empty()).count();

        let lemmas = self.normalizer.normalize(&texts);
        let top = aggregate(&lemmas, TOP_K);

        tracing::info!(
            "query {query:?}: {fetched}/{} pages with text, {} lemmas, {} terms covering {} occurrences in {:?}",
            texts.len(),
            lemmas.len(),
            top.len(),
            top.total_count(),
            start.elapsed()
        );
        top
    }
}
