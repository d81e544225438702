// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which upstream shape a record came from. Drives text cleanup and the
/// expected timestamp format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    /// Backend aggregation service (`/fetch-news/{q}`, `/news`).
    Aggregator,
    /// Syndication feed item (HTML in text, RFC 2822 dates).
    Feed,
}

/// `source` is either `{ "name": ... }` or a plain string depending on origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceField {
    Named { name: Option<String> },
    Plain(String),
}

impl SourceField {
    pub fn name(&self) -> Option<&str> {
        match self {
            SourceField::Named { name } => name.as_deref(),
            SourceField::Plain(s) => Some(s.as_str()),
        }
    }
}

/// Raw record from any upstream. Every field is optional; the adapter decides
/// what a missing value degrades to.
///
/// Decoding never fails: scalars are stringified, the first usable alias
/// wins, and values of the wrong shape are dropped and named in
/// `shape_issues`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct OriginRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<SourceField>,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub url: Option<String>,
    /// Fields that were present but unusable.
    #[serde(skip)]
    pub shape_issues: Vec<String>,
}

impl From<Value> for OriginRecord {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return OriginRecord {
                shape_issues: vec!["record".to_string()],
                ..Default::default()
            };
        };

        let mut issues = Vec::new();
        let title = lenient_text(&map, &["title"], &mut issues);
        let description = lenient_text(&map, &["description", "summary"], &mut issues);
        let category = lenient_text(&map, &["category"], &mut issues);
        let sentiment = lenient_text(&map, &["sentiment"], &mut issues);
        let published_at = lenient_text(
            &map,
            &["publishedAt", "published_at", "pubDate"],
            &mut issues,
        );
        let url = lenient_text(&map, &["url", "link"], &mut issues);
        let source = lenient_source(&map, &mut issues);

        OriginRecord {
            title,
            description,
            source,
            category,
            sentiment,
            published_at,
            url,
            shape_issues: issues,
        }
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First alias holding a scalar. Nulls count as absent.
fn lenient_text(map: &Map<String, Value>, keys: &[&str], issues: &mut Vec<String>) -> Option<String> {
    for key in keys {
        match map.get(*key) {
            None | Some(Value::Null) => continue,
            Some(v) => match scalar_text(v) {
                Some(s) => return Some(s),
                None => issues.push((*key).to_string()),
            },
        }
    }
    None
}

fn lenient_source(map: &Map<String, Value>, issues: &mut Vec<String>) -> Option<SourceField> {
    for key in ["source", "sourceName", "source_name"] {
        match map.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(inner)) => {
                let name = match inner.get("name") {
                    None | Some(Value::Null) => None,
                    Some(v) => {
                        let name = scalar_text(v);
                        if name.is_none() {
                            issues.push(format!("{key}.name"));
                        }
                        name
                    }
                };
                return Some(SourceField::Named { name });
            }
            Some(v) => match scalar_text(v) {
                Some(s) => return Some(SourceField::Plain(s)),
                None => issues.push(key.to_string()),
            },
        }
    }
    None
}

/// Backend aggregation service.
#[async_trait::async_trait]
pub trait NewsBackend: Send + Sync {
    /// Keyword search against the aggregation service.
    async fn fetch_aggregated(&self, query: &str) -> Result<Vec<OriginRecord>>;
    /// Previously persisted records (default view on startup).
    async fn fetch_saved(&self) -> Result<Vec<OriginRecord>>;
    fn name(&self) -> &'static str;
}

/// Direct syndication feed retrieval.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_feed(&self, query: &str) -> Result<Vec<OriginRecord>>;
    fn name(&self) -> &'static str;
}
