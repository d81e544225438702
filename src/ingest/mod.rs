// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::news::{NewsItem, Sentiment, UNCATEGORIZED, UNKNOWN_SOURCE};
use crate::ingest::types::{OriginKind, OriginRecord};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Register help text with whatever recorder is installed right now.
pub(crate) fn describe_metrics() {
    describe_counter!("news_fetch_total", "Top-level fetches issued, by kind.");
    describe_counter!("news_fetch_errors_total", "Top-level fetches that failed.");
    describe_counter!(
        "news_stale_responses_total",
        "Fetch results discarded because a newer fetch was issued."
    );
    describe_counter!("ingest_records_total", "Origin records normalized.");
    describe_counter!(
        "normalize_anomalies_total",
        "Records that needed sentinel substitution."
    );
    describe_counter!(
        "sentiment_resolver_calls_total",
        "Classifier invocations made by the sentiment resolver."
    );
    describe_counter!(
        "sentiment_resolver_fallbacks_total",
        "Classifier failures/timeouts resolved to Unclassified."
    );
    describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    describe_histogram!("enrich_batch_ms", "Enrichment batch time in milliseconds.");
}

/// Something the adapter had to paper over while normalizing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    MissingTitle,
    UnparsableTimestamp(String),
    UnknownSentiment(String),
    /// A field was present with a value of the wrong shape and was ignored.
    UnexpectedShape(String),
}

/// Clean feed text: decode entities, strip tags, fold quotes, collapse
/// whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    out = collapse_ws(&out);

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Collapse runs of whitespace (incl. NBSP) into single spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse the timestamp spellings seen across origins into a UTC instant.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(odt) = OffsetDateTime::parse(s, &Rfc2822) {
        return DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn clean_field(raw: Option<&str>, origin: OriginKind) -> Option<String> {
    let cleaned = match origin {
        OriginKind::Feed => normalize_text(raw?),
        OriginKind::Aggregator => collapse_ws(raw?),
    };
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Normalize one origin record and report what had to be substituted.
pub fn normalize_with_report(raw: &OriginRecord, origin: OriginKind) -> (NewsItem, Vec<Anomaly>) {
    let mut anomalies: Vec<Anomaly> = raw
        .shape_issues
        .iter()
        .cloned()
        .map(Anomaly::UnexpectedShape)
        .collect();

    let title = match raw.title.as_deref() {
        Some(t) => clean_field(Some(t), origin).unwrap_or_default(),
        None => {
            anomalies.push(Anomaly::MissingTitle);
            String::new()
        }
    };

    let source_name = clean_field(raw.source.as_ref().and_then(|s| s.name()), origin)
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
    let category = clean_field(raw.category.as_deref(), origin)
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let sentiment = match raw.sentiment.as_deref() {
        Some(label) if !label.trim().is_empty() => Sentiment::lookup(label).unwrap_or_else(|| {
            anomalies.push(Anomaly::UnknownSentiment(label.to_string()));
            Sentiment::Unclassified
        }),
        _ => Sentiment::Unclassified,
    };

    let published_at = match raw.published_at.as_deref() {
        Some(ts) if !ts.trim().is_empty() => {
            let parsed = parse_timestamp(ts);
            if parsed.is_none() {
                anomalies.push(Anomaly::UnparsableTimestamp(ts.to_string()));
            }
            parsed
        }
        _ => None,
    };

    let item = NewsItem {
        title,
        description: clean_field(raw.description.as_deref(), origin),
        source_name,
        category,
        sentiment,
        published_at,
        url: raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    };
    (item, anomalies)
}

/// Normalize one origin record. Never fails; anomalies are logged and counted.
pub fn normalize(raw: &OriginRecord, origin: OriginKind) -> NewsItem {
    let (item, anomalies) = normalize_with_report(raw, origin);
    if !anomalies.is_empty() {
        counter!("normalize_anomalies_total").increment(1);
        tracing::warn!(
            target: "ingest",
            ?origin,
            anomalies = ?anomalies,
            title = %item.title,
            "record normalized with substitutions"
        );
    }
    item
}

/// Normalize a whole upstream batch, preserving order.
pub fn normalize_batch(raw: &[OriginRecord], origin: OriginKind) -> Vec<NewsItem> {
    ensure_metrics_described();
    counter!("ingest_records_total").increment(raw.len() as u64);
    raw.iter().map(|r| normalize(r, origin)).collect()
}
