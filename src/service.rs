//! # News service
//! Owns the upstream providers, the enricher and the session state. Every
//! mutation goes through [`reduce`]; this type only sequences the async work
//! around it.

use anyhow::Result;
use metrics::counter;
use std::sync::{Arc, RwLock};

use crate::config::NewsConfig;
use crate::enrich::Enricher;
use crate::ingest::providers::{backend::HttpNewsBackend, feed_rss::RssFeedProvider};
use crate::ingest::types::{FeedProvider, NewsBackend, OriginKind, OriginRecord};
use crate::ingest::{ensure_metrics_described, normalize_batch};
use crate::news::needs_enrichment;
use crate::sentiment::{build_classifier, SentimentResolver};
use crate::state::{reduce, Action, FetchKind, NewsState, RequestId, Snapshot};

pub struct NewsService {
    backend: Arc<dyn NewsBackend>,
    feed: Arc<dyn FeedProvider>,
    enricher: Enricher,
    state: RwLock<NewsState>,
}

impl NewsService {
    pub fn new(
        backend: Arc<dyn NewsBackend>,
        feed: Arc<dyn FeedProvider>,
        enricher: Enricher,
        initial: NewsState,
    ) -> Self {
        ensure_metrics_described();
        Self {
            backend,
            feed,
            enricher,
            state: RwLock::new(initial),
        }
    }

    /// Wire HTTP providers and the configured classifier.
    pub fn from_config(cfg: &NewsConfig) -> Result<Self> {
        let backend = HttpNewsBackend::new(&cfg.api_url, cfg.http_timeout())?;
        let feed = RssFeedProvider::from_url(
            &cfg.feed_url,
            &cfg.feed_query_param,
            cfg.http_timeout(),
        )?;
        let classifier = build_classifier(&cfg.classifier)?;
        let resolver = SentimentResolver::new(classifier, cfg.classifier_timeout());
        Ok(Self::new(
            Arc::new(backend),
            Arc::new(feed),
            Enricher::new(resolver, cfg.enrich_concurrency),
            NewsState::new(cfg.page_size()),
        ))
    }

    /// Apply one action and return the derived view.
    pub fn dispatch(&self, action: Action) -> Snapshot {
        let mut guard = self.state.write().expect("news state lock poisoned");
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, action);
        guard.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state
            .read()
            .expect("news state lock poisoned")
            .snapshot()
    }

    /// Default view: previously persisted records.
    pub async fn load_saved(&self) -> Snapshot {
        self.run_fetch(FetchKind::Saved, String::new()).await
    }

    /// Keyword search against the aggregation backend. A blank query loads
    /// the saved records instead.
    pub async fn search(&self, query: &str) -> Snapshot {
        self.dispatch(Action::SetQuery(query.to_string()));
        let q = query.trim();
        if q.is_empty() {
            return self.load_saved().await;
        }
        self.run_fetch(FetchKind::Aggregated, q.to_string()).await
    }

    /// Keyword search against the syndication feed. A blank query loads the
    /// saved records instead.
    pub async fn search_feed(&self, query: &str) -> Snapshot {
        self.dispatch(Action::SetQuery(query.to_string()));
        let q = query.trim();
        if q.is_empty() {
            return self.load_saved().await;
        }
        self.run_fetch(FetchKind::Feed, q.to_string()).await
    }

    fn start(&self, kind: FetchKind) -> RequestId {
        let mut guard = self.state.write().expect("news state lock poisoned");
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, Action::FetchStarted(kind));
        guard.latest_request()
    }

    /// Dispatch a fetch completion, noting when it lost the race.
    fn complete(&self, kind: FetchKind, action: Action, request: RequestId) {
        let mut guard = self.state.write().expect("news state lock poisoned");
        if !guard.accepts(request) {
            counter!("news_stale_responses_total").increment(1);
            tracing::debug!(
                target: "state",
                ?kind,
                request,
                latest = guard.latest_request(),
                "discarding stale fetch result"
            );
            return;
        }
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, action);
    }

    async fn fetch_records(&self, kind: FetchKind, query: &str) -> Result<Vec<OriginRecord>> {
        match kind {
            FetchKind::Saved => self.backend.fetch_saved().await,
            FetchKind::Aggregated => self.backend.fetch_aggregated(query).await,
            FetchKind::Feed => self.feed.fetch_feed(query).await,
        }
    }

    async fn run_fetch(&self, kind: FetchKind, query: String) -> Snapshot {
        let request = self.start(kind);
        counter!("news_fetch_total", "kind" => kind_label(kind)).increment(1);

        match self.fetch_records(kind, &query).await {
            Ok(raw) => {
                let origin = match kind {
                    FetchKind::Feed => OriginKind::Feed,
                    FetchKind::Saved | FetchKind::Aggregated => OriginKind::Aggregator,
                };
                let items = normalize_batch(&raw, origin);
                tracing::info!(
                    target: "ingest",
                    ?kind,
                    request,
                    %query,
                    records = items.len(),
                    "fetch completed"
                );
                self.complete(kind, Action::FetchSucceeded { request, items }, request);
                self.enrich_working_set(request).await;
            }
            Err(e) => {
                counter!("news_fetch_errors_total", "kind" => kind_label(kind)).increment(1);
                tracing::warn!(
                    target: "ingest",
                    ?kind,
                    request,
                    %query,
                    error = ?e,
                    "fetch failed; keeping previous results"
                );
                let action = Action::FetchFailed {
                    request,
                    message: format!("{e:#}"),
                };
                self.complete(kind, action, request);
            }
        }

        self.snapshot()
    }

    /// Classify whatever the given request committed, if it is still the
    /// visible working set and has gaps.
    async fn enrich_working_set(&self, request: RequestId) {
        let items = {
            let guard = self.state.read().expect("news state lock poisoned");
            if guard.working_set_request() != request || !needs_enrichment(guard.working_set()) {
                return;
            }
            guard.working_set().to_vec()
        };

        let items = self.enricher.enrich(items).await;
        self.dispatch(Action::Enriched { request, items });
    }
}

fn kind_label(kind: FetchKind) -> &'static str {
    match kind {
        FetchKind::Saved => "saved",
        FetchKind::Aggregated => "aggregated",
        FetchKind::Feed => "feed",
    }
}
