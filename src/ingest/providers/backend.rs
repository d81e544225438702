// src/ingest/providers/backend.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{NewsBackend, OriginRecord};

/// Envelope of `/fetch-news/{query}`. A missing `articles` key means no results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Option<Vec<OriginRecord>>,
}

/// HTTP client for the aggregation backend.
pub struct HttpNewsBackend {
    base: Url,
    client: reqwest::Client,
}

impl HttpNewsBackend {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(api_url).with_context(|| format!("invalid api url {api_url}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("api url {api_url} cannot be a base"));
        }
        let client = reqwest::Client::builder()
            .user_agent("cosmos-news-monitor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building backend http client")?;
        Ok(Self { base, client })
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for seg in segments {
                path.push(seg);
            }
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} status"))?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decoding {url}"))
    }
}

#[async_trait]
impl NewsBackend for HttpNewsBackend {
    async fn fetch_aggregated(&self, query: &str) -> Result<Vec<OriginRecord>> {
        let url = self.endpoint(&["fetch-news", query]);
        let body: SearchResponse = self.get_json(url).await?;
        Ok(body.articles.unwrap_or_default())
    }

    async fn fetch_saved(&self) -> Result<Vec<OriginRecord>> {
        let url = self.endpoint(&["news"]);
        self.get_json(url).await
    }

    fn name(&self) -> &'static str {
        "backend"
    }
}
