// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod enrich;
pub mod facets;
pub mod ingest;
pub mod metrics;
pub mod news;
pub mod paginate;
pub mod sentiment;
pub mod service;
pub mod state;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::news::{NewsItem, Sentiment};
pub use crate::service::NewsService;
pub use crate::state::{reduce, Action, NewsState, Snapshot};
