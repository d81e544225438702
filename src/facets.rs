//! Distinct filter options present in the working set.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::news::NewsItem;

/// Selectable filter values. Sentinels are never offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub sources: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

/// Compute over the full working set, not the filtered view, so one active
/// filter never shrinks the options of another.
pub fn facets(items: &[NewsItem]) -> Facets {
    let mut out = Facets::default();
    for it in items {
        if it.has_known_source() {
            out.sources.insert(it.source_name.clone());
        }
        if it.has_category() {
            out.categories.insert(it.category.clone());
        }
    }
    out
}
