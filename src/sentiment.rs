//! Sentiment resolution: classifier abstraction, local lexicon classifier,
//! remote HTTP classifier, and the best-effort resolver that discretizes
//! polarity scores onto [`Sentiment`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClassifierConfig, ClassifierKind};
use crate::news::Sentiment;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Raw classifier output; the sign carries the meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polarity {
    pub polarity: f64,
}

/// External or local text scorer.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify_text(&self, text: &str) -> Result<Polarity>;
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

// ------------------------------------------------------------
// Lexicon classifier
// ------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (score, token count).
    /// Negation: a negator within the previous 1..=3 tokens flips the sign of
    /// the word's lexicon score.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

#[async_trait]
impl Classifier for SentimentAnalyzer {
    async fn classify_text(&self, text: &str) -> Result<Polarity> {
        let (score, _) = self.score_text(text);
        Ok(Polarity {
            polarity: f64::from(score),
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens, lower-cased (Unicode-aware so accented words match).
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "without" | "cannot" | "não" | "nao" | "nem" | "nunca" | "sem"
    )
}

// ------------------------------------------------------------
// Remote classifier
// ------------------------------------------------------------

/// `POST {url}` with `{"text": ...}`, expects `{"polarity": <number>}`.
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("cosmos-news-monitor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building classifier http client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify_text(&self, text: &str) -> Result<Polarity> {
        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
        }

        let resp = self
            .http
            .post(&self.url)
            .json(&Req { text })
            .send()
            .await
            .context("classifier request")?
            .error_for_status()
            .context("classifier status")?;
        resp.json::<Polarity>().await.context("classifier body")
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Build the configured classifier. A remote classifier without a URL falls
/// back to the lexicon.
pub fn build_classifier(cfg: &ClassifierConfig) -> Result<DynClassifier> {
    match (cfg.provider, cfg.url.as_deref()) {
        (ClassifierKind::Remote, Some(url)) => Ok(Arc::new(HttpClassifier::new(
            url,
            Duration::from_millis(cfg.timeout_ms),
        )?)),
        (ClassifierKind::Remote, None) => {
            tracing::warn!("remote classifier configured without url; using lexicon");
            Ok(Arc::new(SentimentAnalyzer::new()))
        }
        (ClassifierKind::Lexicon, _) => Ok(Arc::new(SentimentAnalyzer::new())),
    }
}

// ------------------------------------------------------------
// Resolver
// ------------------------------------------------------------

/// Best-effort text → [`Sentiment`]. Never fails: blank input, classifier
/// errors and timeouts all resolve to `Unclassified`.
#[derive(Clone)]
pub struct SentimentResolver {
    classifier: DynClassifier,
    timeout: Duration,
}

impl SentimentResolver {
    pub fn new(classifier: DynClassifier, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    pub async fn resolve(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::Unclassified;
        }

        counter!("sentiment_resolver_calls_total").increment(1);
        let outcome = tokio::time::timeout(self.timeout, self.classifier.classify_text(text)).await;
        match outcome {
            Ok(Ok(p)) => Sentiment::from_polarity(p.polarity),
            Ok(Err(e)) => {
                counter!("sentiment_resolver_fallbacks_total").increment(1);
                tracing::warn!(
                    target: "enrich",
                    error = ?e,
                    classifier = self.classifier.name(),
                    "classifier failed"
                );
                Sentiment::Unclassified
            }
            Err(_) => {
                counter!("sentiment_resolver_fallbacks_total").increment(1);
                tracing::warn!(
                    target: "enrich",
                    classifier = self.classifier.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "classifier timed out"
                );
                Sentiment::Unclassified
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_scores_and_negates() {
        let a = SentimentAnalyzer::new();
        assert!(a.score_text("Stocks rally on strong growth").0 > 0);
        assert!(a.score_text("Bolsa despenca com crise").0 < 0);
        assert!(a.score_text("Earnings not strong").0 < 0);
        assert_eq!(a.score_text("The meeting is on Tuesday"), (0, 5));
    }

    struct Failing;

    #[async_trait]
    impl Classifier for Failing {
        async fn classify_text(&self, _text: &str) -> Result<Polarity> {
            anyhow::bail!("boom")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Slow;

    #[async_trait]
    impl Classifier for Slow {
        async fn classify_text(&self, _text: &str) -> Result<Polarity> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Polarity { polarity: 1.0 })
        }
        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn lexicon_resolver_discretizes() {
        let r = SentimentResolver::new(Arc::new(SentimentAnalyzer::new()), Duration::from_secs(1));
        assert_eq!(r.resolve("Markets surge to record").await, Sentiment::Positive);
        assert_eq!(r.resolve("Banks collapse").await, Sentiment::Negative);
        assert_eq!(r.resolve("Quarterly report published").await, Sentiment::Neutral);
        assert_eq!(r.resolve("   ").await, Sentiment::Unclassified);
    }

    #[tokio::test]
    async fn failures_degrade_to_unclassified() {
        let r = SentimentResolver::new(Arc::new(Failing), Duration::from_secs(1));
        assert_eq!(r.resolve("anything").await, Sentiment::Unclassified);
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_degrade_to_unclassified() {
        let r = SentimentResolver::new(Arc::new(Slow), Duration::from_millis(50));
        assert_eq!(r.resolve("anything").await, Sentiment::Unclassified);
    }

    #[test]
    fn remote_without_url_uses_lexicon() {
        let cfg = ClassifierConfig {
            provider: ClassifierKind::Remote,
            url: None,
            timeout_ms: 100,
        };
        assert_eq!(build_classifier(&cfg).unwrap().name(), "lexicon");
    }
}
