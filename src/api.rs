use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::news::Sentiment;
use crate::paginate::PageSize;
use crate::service::NewsService;
use crate::state::{Action, FilterUpdate, Snapshot};
use crate::view::SortOrder;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

type ApiResult = Result<Json<Snapshot>, (StatusCode, String)>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/news", get(current))
        .route("/news/refresh", post(refresh))
        .route("/news/search", post(search))
        .route("/news/filters", post(set_filters))
        .route("/news/filters/reset", post(reset_filters))
        .route("/news/page", post(go_to_page))
        .route("/news/page/next", post(next_page))
        .route("/news/page/prev", post(prev_page))
        .route("/news/page-size", post(set_page_size))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn current(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.snapshot())
}

async fn refresh(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.load_saved().await)
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum SearchOrigin {
    #[default]
    Aggregated,
    Feed,
}

#[derive(serde::Deserialize)]
struct SearchReq {
    #[serde(default)]
    query: String,
    #[serde(default)]
    origin: SearchOrigin,
}

async fn search(State(state): State<AppState>, Json(body): Json<SearchReq>) -> Json<Snapshot> {
    let snap = match body.origin {
        SearchOrigin::Aggregated => state.service.search(&body.query).await,
        SearchOrigin::Feed => state.service.search_feed(&body.query).await,
    };
    Json(snap)
}

#[derive(serde::Deserialize)]
struct FiltersReq {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sort: Option<SortOrder>,
}

/// Filter-side sentiment choice. Blank or "any"-style labels clear the
/// filter; other labels must name a sentiment.
fn sentiment_choice(raw: Option<&str>) -> Result<Option<Sentiment>, (StatusCode, String)> {
    let Some(label) = raw.map(str::trim) else {
        return Ok(None);
    };
    match label.to_lowercase().as_str() {
        "" | "any" | "all" | "none" | "unknown" => Ok(None),
        _ => Sentiment::lookup(label).map(Some).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("unknown sentiment label '{label}'"),
            )
        }),
    }
}

async fn set_filters(State(state): State<AppState>, Json(body): Json<FiltersReq>) -> ApiResult {
    let update = FilterUpdate {
        source: body.source,
        sentiment: sentiment_choice(body.sentiment.as_deref())?,
        category: body.category,
        sort_order: body.sort,
    };
    Ok(Json(state.service.dispatch(Action::SetFilters(update))))
}

async fn reset_filters(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.dispatch(Action::ResetFilters))
}

#[derive(serde::Deserialize)]
struct PageReq {
    page: usize,
}

async fn go_to_page(State(state): State<AppState>, Json(body): Json<PageReq>) -> Json<Snapshot> {
    Json(state.service.dispatch(Action::GoToPage(body.page)))
}

async fn next_page(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.dispatch(Action::NextPage))
}

async fn prev_page(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.dispatch(Action::PrevPage))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageSizeReq {
    page_size: u32,
}

async fn set_page_size(State(state): State<AppState>, Json(body): Json<PageSizeReq>) -> ApiResult {
    let size =
        PageSize::try_from(body.page_size).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    Ok(Json(state.service.dispatch(Action::SetPageSize(size))))
}
