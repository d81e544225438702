// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paginate::PageSize;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_API_URL: &str = "NEWS_API_URL";
pub const ENV_FEED_URL: &str = "NEWS_FEED_URL";
pub const ENV_CLASSIFIER_URL: &str = "CLASSIFIER_URL";

pub const DEFAULT_API_URL: &str = "https://cosmosinvestapp.azurewebsites.net";
pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Lexicon,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub provider: ClassifierKind,
    /// Required for `remote`.
    pub url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierKind::Lexicon,
            url: None,
            timeout_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_url: String,
    pub feed_url: String,
    /// Query-string parameter carrying the search terms on `feed_url`.
    pub feed_query_param: String,
    pub http_timeout_secs: u64,
    /// Upper bound on in-flight classifier calls per enrichment batch.
    pub enrich_concurrency: usize,
    pub default_page_size: u32,
    pub classifier: ClassifierConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_query_param: "q".to_string(),
            http_timeout_secs: 10,
            enrich_concurrency: 8,
            default_page_size: 20,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl NewsConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier.timeout_ms)
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::try_from(self.default_page_size).unwrap_or_default()
    }

    /// Env overrides win over file values.
    fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var(ENV_API_URL) {
            if !v.trim().is_empty() {
                self.api_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var(ENV_FEED_URL) {
            if !v.trim().is_empty() {
                self.feed_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var(ENV_CLASSIFIER_URL) {
            if !v.trim().is_empty() {
                self.classifier.url = Some(v.trim().to_string());
            }
        }
        self
    }

    /// Replace out-of-range values with defaults.
    fn sanitized(mut self) -> Self {
        let d = Self::default();
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = d.http_timeout_secs;
        }
        if self.enrich_concurrency == 0 {
            self.enrich_concurrency = d.enrich_concurrency;
        }
        if PageSize::try_from(self.default_page_size).is_err() {
            self.default_page_size = d.default_page_size;
        }
        if self.classifier.timeout_ms == 0 {
            self.classifier.timeout_ms = d.classifier.timeout_ms;
        }
        if self.feed_query_param.trim().is_empty() {
            self.feed_query_param = d.feed_query_param;
        }
        self
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<NewsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading news config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing news config {}", path.display()))?;
    Ok(cfg.apply_env().sanitized())
}

/// Load config using env var + fallbacks:
/// 1) $NEWS_CONFIG_PATH
/// 2) config/news.toml
/// 3) config/news.json
/// 4) built-in defaults
pub fn load_default() -> Result<NewsConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("NEWS_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/news.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/news.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(NewsConfig::default().apply_env().sanitized())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<NewsConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("json config");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("toml config");
    }
    // Unknown extension: JSON if it looks like an object, TOML otherwise.
    if s.trim_start().starts_with('{') {
        serde_json::from_str(s).context("json config")
    } else {
        toml::from_str(s).context("toml config")
    }
}
