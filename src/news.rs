//! # News model
//! Canonical record shape shared by every stage of the pipeline.
//!
//! A `NewsItem` is produced by the source adapter (`ingest::normalize`) and is
//! only ever touched again by the enrichment stage, which attaches a sentiment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for records whose source could not be resolved.
pub const UNKNOWN_SOURCE: &str = "unknown";
/// Sentinel for records without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Closed sentiment vocabulary. Every origin-specific spelling is folded onto
/// one of these four values at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    #[default]
    Unclassified,
}

/// Label table: (lower-case label, sentiment). Add new origin vocabularies here.
const LABELS: &[(&str, Sentiment)] = &[
    // English / canonical
    ("positive", Sentiment::Positive),
    ("negative", Sentiment::Negative),
    ("neutral", Sentiment::Neutral),
    ("unclassified", Sentiment::Unclassified),
    // classifier-style tags
    ("pos", Sentiment::Positive),
    ("neg", Sentiment::Negative),
    ("neu", Sentiment::Neutral),
    ("bullish", Sentiment::Positive),
    ("bearish", Sentiment::Negative),
    ("mixed", Sentiment::Neutral),
    ("unknown", Sentiment::Unclassified),
    ("none", Sentiment::Unclassified),
    // Portuguese (backend labels)
    ("positivo", Sentiment::Positive),
    ("positiva", Sentiment::Positive),
    ("negativo", Sentiment::Negative),
    ("negativa", Sentiment::Negative),
    ("neutro", Sentiment::Neutral),
    ("neutra", Sentiment::Neutral),
    ("não classificado", Sentiment::Unclassified),
    ("nao classificado", Sentiment::Unclassified),
];

impl Sentiment {
    /// Case-insensitive table lookup. `None` for labels outside the table.
    pub fn lookup(label: &str) -> Option<Self> {
        let key = label.trim().to_lowercase();
        LABELS
            .iter()
            .find(|(l, _)| *l == key)
            .map(|(_, s)| *s)
    }

    /// Lookup that folds unrecognized labels onto `Unclassified`.
    pub fn from_label(label: &str) -> Self {
        Self::lookup(label).unwrap_or(Self::Unclassified)
    }

    /// Discretize a classifier polarity score. NaN is treated as unscored.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity.is_nan() {
            Self::Unclassified
        } else if polarity > 0.0 {
            Self::Positive
        } else if polarity < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn is_classified(self) -> bool {
        self != Self::Unclassified
    }
}

/// Canonical news record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub description: Option<String>,
    /// Never empty; `UNKNOWN_SOURCE` when the origin gave nothing usable.
    pub source_name: String,
    /// Never empty; `UNCATEGORIZED` when the origin gave nothing usable.
    pub category: String,
    pub sentiment: Sentiment,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl NewsItem {
    pub fn has_known_source(&self) -> bool {
        self.source_name != UNKNOWN_SOURCE
    }

    pub fn has_category(&self) -> bool {
        self.category != UNCATEGORIZED
    }
}

/// True if at least one item still lacks a sentiment label.
pub fn needs_enrichment(items: &[NewsItem]) -> bool {
    items.iter().any(|it| !it.sentiment.is_classified())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_and_vocabulary_tolerant() {
        assert_eq!(Sentiment::lookup("POSITIVE"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::lookup(" neg "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::lookup("Neutro"), Some(Sentiment::Neutral));
        assert_eq!(
            Sentiment::lookup("Não Classificado"),
            Some(Sentiment::Unclassified)
        );
        assert_eq!(Sentiment::lookup("ecstatic"), None);
        assert_eq!(Sentiment::from_label("ecstatic"), Sentiment::Unclassified);
    }

    #[test]
    fn polarity_is_discretized_by_sign() {
        assert_eq!(Sentiment::from_polarity(0.3), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-2.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(f64::NAN), Sentiment::Unclassified);
    }

    #[test]
    fn serializes_camel_case() {
        let it = NewsItem {
            title: "t".into(),
            description: None,
            source_name: "Reuters".into(),
            category: UNCATEGORIZED.into(),
            sentiment: Sentiment::Neutral,
            published_at: None,
            url: None,
        };
        let v = serde_json::to_value(&it).unwrap();
        assert_eq!(v["sourceName"], "Reuters");
        assert_eq!(v["sentiment"], "Neutral");
        assert!(v.get("publishedAt").is_some());
    }
}
