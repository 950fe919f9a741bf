//! Periodic trigger for the watchlist pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::engine::AlertEngine;

/// Spawn the background task that runs a watchlist pass every `interval`.
/// The first pass runs immediately after spawn.
pub fn spawn_watchlist_scheduler(engine: Arc<AlertEngine>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let started = std::time::Instant::now();
            engine.run_watchlist_pass().await;
            tracing::info!(
                target: "scheduler",
                elapsed_ms = started.elapsed().as_millis() as u64,
                "watchlist pass finished"
            );
        }
    })
}
