//! # Session state
//! Explicit state container with a pure `reduce(state, action) -> state`
//! transition. Everything the presentation layer sees (page slice, facets,
//! page count) is recomputed from the canonical fields in [`NewsState::snapshot`].
//!
//! Fetches are tagged with a monotonically increasing request id at
//! `FetchStarted`. A completion whose id is not the latest issued is dropped,
//! so the visible working set always belongs to the most recently issued fetch
//! that has completed.

use serde::Serialize;

use crate::facets::{facets, Facets};
use crate::news::{NewsItem, Sentiment};
use crate::paginate::{page, total_pages, PageSize, PageState};
use crate::view::{view, FilterState, SortOrder};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    Saved,
    Aggregated,
    Feed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading {
        kind: FetchKind,
    },
    Ready,
    Failed {
        message: String,
    },
}

/// Replacement predicates for [`Action::SetFilters`]. A `None` sort order
/// keeps the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterUpdate {
    pub source: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub category: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetQuery(String),
    SetSource(Option<String>),
    SetSentiment(Option<Sentiment>),
    SetCategory(Option<String>),
    SetSortOrder(SortOrder),
    SetFilters(FilterUpdate),
    ResetFilters,
    SetPageSize(PageSize),
    NextPage,
    PrevPage,
    GoToPage(usize),
    FetchStarted(FetchKind),
    FetchSucceeded {
        request: RequestId,
        items: Vec<NewsItem>,
    },
    FetchFailed {
        request: RequestId,
        message: String,
    },
    Enriched {
        request: RequestId,
        items: Vec<NewsItem>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct NewsState {
    query: String,
    working_set: Vec<NewsItem>,
    filter: FilterState,
    page: PageState,
    status: FetchStatus,
    latest_request: RequestId,
    working_set_request: RequestId,
}

impl NewsState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: PageState::first(page_size),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn working_set(&self) -> &[NewsItem] {
        &self.working_set
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn latest_request(&self) -> RequestId {
        self.latest_request
    }

    pub fn working_set_request(&self) -> RequestId {
        self.working_set_request
    }

    /// Would a fetch completion with this id be committed?
    pub fn accepts(&self, request: RequestId) -> bool {
        request == self.latest_request
    }

    fn filtered_count(&self) -> usize {
        self.working_set
            .iter()
            .filter(|it| self.filter.matches(it))
            .count()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_count(), self.page.page_size)
    }

    fn with_filter(mut self, filter: FilterState) -> Self {
        if filter != self.filter {
            self.filter = filter;
            self.page = PageState::first(self.page.page_size);
        }
        self
    }

    fn clamp_page(mut self) -> Self {
        let total = self.total_pages();
        self.page = self.page.clamped(total);
        self
    }

    /// Derived view for the presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        let visible = view(&self.working_set, &self.filter);
        let current = page(&visible, &self.page);
        let failed = matches!(self.status, FetchStatus::Failed { .. });
        Snapshot {
            query: self.query.clone(),
            items: current.slice.to_vec(),
            current_page: self.page.current_page,
            total_pages: current.total_pages,
            page_size: self.page.page_size,
            filtered_count: visible.len(),
            total_count: self.working_set.len(),
            facets: facets(&self.working_set),
            filter: self.filter.clone(),
            loading: matches!(self.status, FetchStatus::Loading { .. }),
            no_results: failed || visible.is_empty(),
            status: self.status.clone(),
        }
    }
}

/// Empty/whitespace selections mean "no filter".
fn choice(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn reduce(state: NewsState, action: Action) -> NewsState {
    match action {
        Action::SetQuery(query) => NewsState { query, ..state },
        Action::SetSource(source) => {
            let f = FilterState {
                source: choice(source),
                ..state.filter.clone()
            };
            state.with_filter(f)
        }
        Action::SetSentiment(sentiment) => {
            let f = FilterState {
                sentiment,
                ..state.filter.clone()
            };
            state.with_filter(f)
        }
        Action::SetCategory(category) => {
            let f = FilterState {
                category: choice(category),
                ..state.filter.clone()
            };
            state.with_filter(f)
        }
        Action::SetSortOrder(sort_order) => {
            let f = FilterState {
                sort_order,
                ..state.filter.clone()
            };
            state.with_filter(f)
        }
        Action::SetFilters(u) => {
            let f = FilterState {
                source: choice(u.source),
                sentiment: u.sentiment,
                category: choice(u.category),
                sort_order: u.sort_order.unwrap_or(state.filter.sort_order),
            };
            state.with_filter(f)
        }
        Action::ResetFilters => state.with_filter(FilterState::default()),
        Action::SetPageSize(size) => NewsState {
            page: PageState::first(size),
            ..state
        },
        Action::NextPage => {
            let total = state.total_pages();
            NewsState {
                page: state.page.next(total),
                ..state
            }
        }
        Action::PrevPage => {
            let total = state.total_pages();
            NewsState {
                page: state.page.prev(total),
                ..state
            }
        }
        Action::GoToPage(n) => {
            let total = state.total_pages();
            NewsState {
                page: state.page.go_to(n, total),
                ..state
            }
        }
        Action::FetchStarted(kind) => NewsState {
            latest_request: state.latest_request + 1,
            status: FetchStatus::Loading { kind },
            ..state
        },
        Action::FetchSucceeded { request, items } => {
            if !state.accepts(request) {
                return state;
            }
            NewsState {
                working_set: items,
                working_set_request: request,
                status: FetchStatus::Ready,
                ..state
            }
            .clamp_page()
        }
        Action::FetchFailed { request, message } => {
            if !state.accepts(request) {
                return state;
            }
            // The previous working set stays visible.
            NewsState {
                status: FetchStatus::Failed { message },
                ..state
            }
        }
        Action::Enriched { request, items } => {
            if request != state.working_set_request || items.len() != state.working_set.len() {
                return state;
            }
            NewsState {
                working_set: items,
                ..state
            }
            .clamp_page()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub query: String,
    pub items: Vec<NewsItem>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: PageSize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub facets: Facets,
    pub filter: FilterState,
    pub status: FetchStatus,
    pub loading: bool,
    pub no_results: bool,
}
