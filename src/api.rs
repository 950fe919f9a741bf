//! HTTP surface consumed by the command layer.
//!
//! Direct-query endpoints (`/analyze`, `/score-batch`, `/sentiment`) run the
//! Normalizer → Scorer → Aggregator path without touching history; the
//! throttled ones require a `requester_id`. Watchlist admin endpoints mutate
//! the in-memory registry the scheduled pass reads from.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::aggregate::{aggregate, RawItem};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::history::InMemoryHistory;
use crate::report::{format_sentiment_report, sentiment_label};
use crate::sentiment::PolarityScorer;
use crate::source::TextSource;
use crate::subject::validate_subject;
use crate::throttle::RequestThrottle;
use crate::watchlist::InMemoryWatchlist;

#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<PolarityScorer>,
    pub throttle: Arc<RequestThrottle>,
    pub watchlist: Arc<InMemoryWatchlist>,
    pub history: Arc<InMemoryHistory>,
    pub source: Arc<dyn TextSource>,
    pub config: Arc<EngineConfig>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/score-batch", post(score_batch))
        .route("/sentiment", get(sentiment))
        .route("/track", post(track))
        .route("/untrack", post(untrack))
        .route("/watchlist", get(watchlist_view))
        .route("/debug/history", get(debug_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn error_response(err: EngineError) -> Response {
    let (status, retry_after) = match &err {
        EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, None),
        EngineError::RateLimited { retry_after_secs } => {
            (StatusCode::TOO_MANY_REQUESTS, Some(*retry_after_secs))
        }
        _ => (StatusCode::BAD_GATEWAY, None),
    };
    let mut body = json!({ "error": err.to_string() });
    if let Some(secs) = retry_after {
        body["retry_after_seconds"] = json!(secs);
    }
    (status, Json(body)).into_response()
}

/// Throttle gate shared by the direct-query endpoints.
fn gate(throttle: &RequestThrottle, requester_id: &str) -> Result<(), EngineError> {
    let (allowed, retry_after_secs) = throttle.check(requester_id);
    if allowed {
        Ok(())
    } else {
        Err(EngineError::RateLimited { retry_after_secs })
    }
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

#[derive(serde::Serialize)]
struct AnalyzeResp {
    score: f64,
    label: &'static str,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<AnalyzeResp> {
    let score = state.scorer.score(&body.text);
    Json(AnalyzeResp {
        score,
        label: sentiment_label(score),
    })
}

#[derive(serde::Deserialize)]
struct ScoreBatchReq {
    requester_id: String,
    items: Vec<RawItem>,
}

async fn score_batch(State(state): State<AppState>, Json(body): Json<ScoreBatchReq>) -> Response {
    if let Err(e) = gate(&state.throttle, &body.requester_id) {
        return error_response(e);
    }
    Json(aggregate(&state.scorer, &body.items)).into_response()
}

async fn sentiment(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let Some(requester_id) = q.get("requester_id") else {
        return error_response(EngineError::InvalidInput(
            "requester_id is required".to_string(),
        ));
    };
    // Throttle before validation; invalid subjects still spend a slot.
    if let Err(e) = gate(&state.throttle, requester_id) {
        return error_response(e);
    }
    let raw_subject = q.get("subject").map(String::as_str).unwrap_or_default();
    let subject = match validate_subject(raw_subject) {
        Ok(s) => state.config.resolve_alias(&s),
        Err(e) => return error_response(e),
    };

    let since = chrono::Utc::now() - chrono::Duration::hours(state.config.recency_window_hours as i64);
    let items = match state
        .source
        .fetch_batch(&subject, state.config.post_limit, since)
        .await
    {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(subject = %subject, error = ?e, "direct-query fetch failed");
            return error_response(EngineError::SourceUnavailable(format!("{e:#}")));
        }
    };

    if items.is_empty() {
        return Json(json!({
            "subject": subject,
            "sample_size": 0,
            "message": "no recent posts found for this subject",
        }))
        .into_response();
    }

    // Direct queries do not write history; only the scheduled pass does.
    let agg = aggregate(&state.scorer, &items);
    let report = format_sentiment_report(&subject, &agg);
    Json(json!({
        "subject": subject,
        "aggregate": agg,
        "report": report,
    }))
    .into_response()
}

#[derive(serde::Deserialize)]
struct WatchReq {
    subscriber_id: i64,
    subject: String,
}

async fn track(State(state): State<AppState>, Json(body): Json<WatchReq>) -> Response {
    let subject = match validate_subject(&body.subject) {
        Ok(s) => state.config.resolve_alias(&s),
        Err(e) => return error_response(e),
    };
    let created = state.watchlist.track(body.subscriber_id, &subject);
    Json(json!({ "subject": subject, "created": created })).into_response()
}

async fn untrack(State(state): State<AppState>, Json(body): Json<WatchReq>) -> Response {
    let subject = match validate_subject(&body.subject) {
        Ok(s) => state.config.resolve_alias(&s),
        Err(e) => return error_response(e),
    };
    let removed = state.watchlist.untrack(body.subscriber_id, &subject);
    Json(json!({ "subject": subject, "removed": removed })).into_response()
}

async fn watchlist_view(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let Some(id) = q.get("subscriber_id").and_then(|s| s.parse::<i64>().ok()) else {
        return error_response(EngineError::InvalidInput(
            "subscriber_id must be an integer".to_string(),
        ));
    };
    Json(json!({ "subjects": state.watchlist.subjects_for(id) })).into_response()
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let subject = q.get("subject").cloned().unwrap_or_default();
    let limit = q
        .get("limit")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);
    Json(state.history.snapshot_last_n(&subject, limit)).into_response()
}
