//! # Filter / sort engine
//! Pure view over the working set: conjunctive predicates plus a
//! publication-time ordering.
//!
//! Items without a usable timestamp are kept but placed after every dated
//! item, in their input order. Their position relative to dated items is not
//! part of the contract.

use serde::{Deserialize, Serialize};

use crate::news::{NewsItem, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Recent,
    /// Oldest first.
    Oldest,
}

/// User-selected predicates. `None` means "any".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub source: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl FilterState {
    pub fn matches(&self, item: &NewsItem) -> bool {
        self.source.as_deref().is_none_or(|s| item.source_name == s)
            && self.sentiment.is_none_or(|s| item.sentiment == s)
            && self.category.as_deref().is_none_or(|c| item.category == c)
    }
}

/// Filter then sort. Never mutates `items`.
pub fn view(items: &[NewsItem], filter: &FilterState) -> Vec<NewsItem> {
    let (mut dated, undated): (Vec<&NewsItem>, Vec<&NewsItem>) = items
        .iter()
        .filter(|it| filter.matches(it))
        .partition(|it| it.published_at.is_some());

    // Stable sort: equal timestamps keep input order.
    match filter.sort_order {
        SortOrder::Recent => dated.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
        SortOrder::Oldest => dated.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
    }

    dated.into_iter().chain(undated).cloned().collect()
}
