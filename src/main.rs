//! News monitor binary entrypoint.
//! Boots the Axum HTTP server, loads config, and kicks off the initial load of
//! saved records in the background.

use std::sync::Arc;

use cosmos_news_monitor::api::{self, AppState};
use cosmos_news_monitor::metrics::Metrics;
use cosmos_news_monitor::{config, NewsService};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cosmos_news_monitor=info,warn"));

    // The runtime may have installed a subscriber already; keep it if so.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(api_url = %cfg.api_url, feed_url = %cfg.feed_url, "config loaded");

    let service = Arc::new(NewsService::from_config(&cfg)?);

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics recorder not installed");
            None
        }
    };

    // Startup view: saved records. Failures only leave the view empty.
    let startup = service.clone();
    tokio::spawn(async move {
        let snap = startup.load_saved().await;
        tracing::info!(items = snap.total_count, "initial load finished");
    });

    let mut router = api::router(AppState { service });
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
