//! Prometheus recorder, series registration, and the `/metrics` route.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time registration of every series the engine emits, so they show up
/// on `/metrics` with help text before their first increment. Safe to call
/// from multiple entry points; later calls are no-ops.
pub fn ensure_engine_series_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("engine_passes_total", "Completed watchlist passes.");
        describe_counter!("engine_subjects_checked_total", "Subjects examined across passes.");
        describe_counter!("engine_subjects_skipped_total", "Subjects skipped (no data).");
        describe_counter!("engine_subject_errors_total", "Per-subject fetch/store errors.");
        describe_counter!("engine_alerts_total", "Threshold breaches that produced alerts.");
        describe_counter!(
            "engine_deliveries_failed_total",
            "Individual subscriber deliveries that failed."
        );
        describe_gauge!("engine_last_pass_ts", "Unix ts when the last pass finished.");
        describe_gauge!("engine_alert_threshold", "Configured alert threshold.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder, register the engine series, and
    /// publish the configured alert threshold as a static gauge.
    pub fn init(alert_threshold: f64) -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_engine_series_described();
        gauge!("engine_alert_threshold").set(alert_threshold);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
