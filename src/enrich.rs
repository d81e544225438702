//! # Enrichment
//! Fills in sentiment for unclassified items with a bounded fan-out over the
//! resolver. Output order always matches input order.

use futures::stream::{self, StreamExt};
use metrics::histogram;

use crate::news::{NewsItem, Sentiment};
use crate::sentiment::SentimentResolver;

#[derive(Clone)]
pub struct Enricher {
    resolver: SentimentResolver,
    concurrency: usize,
}

impl Enricher {
    pub fn new(resolver: SentimentResolver, concurrency: usize) -> Self {
        Self {
            resolver,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve every `Unclassified` item by title; classified items pass
    /// through untouched. Returns once every resolution has finished.
    pub async fn enrich(&self, mut items: Vec<NewsItem>) -> Vec<NewsItem> {
        let pending: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, it)| it.sentiment == Sentiment::Unclassified)
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return items;
        }

        let t0 = std::time::Instant::now();
        let titles: Vec<(usize, String)> = pending
            .into_iter()
            .map(|i| (i, items[i].title.clone()))
            .collect();
        let total = titles.len();

        let resolved: Vec<(usize, Sentiment)> = stream::iter(titles)
            .map(|(i, title)| async move { (i, self.resolver.resolve(&title).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut classified = 0usize;
        for (i, sentiment) in resolved {
            if sentiment.is_classified() {
                classified += 1;
            }
            items[i].sentiment = sentiment;
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("enrich_batch_ms").record(ms);
        tracing::info!(
            target: "enrich",
            pending = total,
            classified,
            elapsed_ms = ms as u64,
            "enrichment batch done"
        );
        items
    }
}
