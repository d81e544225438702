// src/ingest/providers/feed_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{FeedProvider, OriginRecord, SourceField};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    category: Vec<TextNode>,
    source: Option<TextNode>,
}

/// Element whose text we want regardless of attributes
/// (`<source url="...">Name</source>`, `<category domain="...">X</category>`).
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

/// RSS provider: either a fixed document (tests/offline) or an HTTP search feed
/// where the query goes into a configurable URL parameter.
pub struct RssFeedProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        query_param: String,
        client: reqwest::Client,
    },
}

impl RssFeedProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: &str, query_param: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cosmos-news-monitor/0.1")
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: url.to_string(),
                query_param: query_param.to_string(),
                client,
            },
        })
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<OriginRecord>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let channel_title = rss.channel.title;
        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            // Per-item <source> wins; aggregating feeds (e.g. Google News) set it.
            let source = it
                .source
                .and_then(|s| s.text)
                .or_else(|| channel_title.clone())
                .map(SourceField::Plain);

            out.push(OriginRecord {
                title: it.title,
                description: it.description,
                source,
                category: it.category.into_iter().find_map(|c| c.text),
                sentiment: None,
                published_at: it.pub_date,
                url: it.link,
                shape_issues: Vec::new(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_feed(&self, query: &str) -> Result<Vec<OriginRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http {
                url,
                query_param,
                client,
            } => {
                let resp = client
                    .get(url.as_str())
                    .query(&[(query_param.as_str(), query)])
                    .send()
                    .await;
                let body = match resp {
                    Ok(resp) => resp
                        .error_for_status()
                        .context("feed http status")?
                        .text()
                        .await
                        .context("feed http .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = "rss", "provider http error");
                        return Err(e).context("feed http get()");
                    }
                };
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Cosmos Wire</title>
    <item>
      <title>Bolsa sobe&nbsp;2%</title>
      <link>https://example.test/a</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
      <description>&lt;p&gt;Ibovespa fecha em alta&lt;/p&gt;</description>
      <category domain="x">Mercado</category>
      <source url="https://g1.example">G1</source>
    </item>
    <item>
      <title>Sem fonte</title>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn parses_items_with_source_fallback() {
        let p = RssFeedProvider::from_fixture_str(XML);
        let items = p.fetch_feed("ignored").await.unwrap();
        assert_eq!(items.len(), 2);

        let a = &items[0];
        assert_eq!(a.title.as_deref(), Some("Bolsa sobe 2%"));
        assert_eq!(a.source.as_ref().and_then(|s| s.name()), Some("G1"));
        assert_eq!(a.category.as_deref(), Some("Mercado"));
        assert_eq!(a.url.as_deref(), Some("https://example.test/a"));
        assert!(a.published_at.is_some());

        let b = &items[1];
        assert_eq!(b.source.as_ref().and_then(|s| s.name()), Some("Cosmos Wire"));
        assert!(b.category.is_none());
    }

    #[tokio::test]
    async fn malformed_xml_is_an_error() {
        let p = RssFeedProvider::from_fixture_str("<rss><channel>");
        assert!(p.fetch_feed("x").await.is_err());
    }
}
