//! Binary entrypoint: boots the Axum HTTP server and the background
//! watchlist scheduler.
//!
//! See `README.md` for quickstart; the live text source and a durable
//! history store are wired in by implementing `TextSource` / `HistoryStore`.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_sentiment_engine::api::{create_router, AppState};
use crypto_sentiment_engine::config::EngineConfig;
use crypto_sentiment_engine::engine::AlertEngine;
use crypto_sentiment_engine::history::InMemoryHistory;
use crypto_sentiment_engine::metrics::Metrics;
use crypto_sentiment_engine::notify::telegram::TelegramNotifier;
use crypto_sentiment_engine::scheduler::spawn_watchlist_scheduler;
use crypto_sentiment_engine::sentiment::PolarityScorer;
use crypto_sentiment_engine::source::{StaticSource, TextSource};
use crypto_sentiment_engine::throttle::{RequestThrottle, SystemClock};
use crypto_sentiment_engine::watchlist::InMemoryWatchlist;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Arc::new(EngineConfig::from_env()?);
    let metrics = Metrics::init(config.alert_threshold);

    let scorer = PolarityScorer::with_defaults();
    let throttle = Arc::new(RequestThrottle::new(
        config.throttle_capacity,
        config.throttle_window_secs,
        Arc::new(SystemClock),
    ));
    let history = Arc::new(InMemoryHistory::new());
    let watchlist = Arc::new(InMemoryWatchlist::new());
    let notifier = Arc::new(TelegramNotifier::from_env());

    // Stand-in source until a live fetcher is wired; passes will skip
    // subjects it has no items for.
    let source = Arc::new(StaticSource::new());
    tracing::warn!(
        source = source.name(),
        "no live text source wired; watchlist passes will skip unknown subjects"
    );

    let engine = Arc::new(AlertEngine::new(
        scorer.clone(),
        source.clone(),
        history.clone(),
        watchlist.clone(),
        notifier,
        &config,
    ));

    spawn_watchlist_scheduler(
        engine,
        Duration::from_secs(config.check_interval_hours * 3600),
    );

    let state = AppState {
        scorer: Arc::new(scorer),
        throttle,
        watchlist,
        history,
        source,
        config: config.clone(),
    };
    let router = create_router(state).merge(metrics.router());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "engine listening");
    axum::serve(listener, router).await?;
    Ok(())
}
