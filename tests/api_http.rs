// tests/api_http.rs
//
// Router-level tests for the direct-query surface and watchlist admin,
// driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use http::StatusCode;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use crypto_sentiment_engine::aggregate::RawItem;
use crypto_sentiment_engine::api::{create_router, AppState};
use crypto_sentiment_engine::config::EngineConfig;
use crypto_sentiment_engine::history::InMemoryHistory;
use crypto_sentiment_engine::sentiment::PolarityScorer;
use crypto_sentiment_engine::source::StaticSource;
use crypto_sentiment_engine::throttle::{RequestThrottle, SystemClock};
use crypto_sentiment_engine::watchlist::InMemoryWatchlist;

/// Router with a tiny throttle (2 req / 60 s) and a static source carrying
/// a few bitcoin posts.
fn test_router() -> Router {
    let source = StaticSource::new().with_items(
        "bitcoin",
        vec![
            RawItem::new("amazing rally, very bullish", 10),
            RawItem::new("nothing new today", 1),
            RawItem::new("terrible dump, total scam", 5),
        ],
    );
    let state = AppState {
        scorer: Arc::new(PolarityScorer::with_defaults()),
        throttle: Arc::new(RequestThrottle::new(2, 60, Arc::new(SystemClock))),
        watchlist: Arc::new(InMemoryWatchlist::new()),
        history: Arc::new(InMemoryHistory::new()),
        source: Arc::new(source),
        config: Arc::new(EngineConfig::default()),
    };
    create_router(state)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let router = test_router();
    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn analyze_scores_and_labels() {
    let router = test_router();
    let (status, body) = post_json(&router, "/analyze", serde_json::json!({"text": "hodl moon, amazing gains"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["score"].as_f64().unwrap() > 0.0);
    assert!(body["label"].as_str().unwrap().contains("Bullish"));
}

#[tokio::test]
async fn sentiment_reports_on_known_subject() {
    let router = test_router();
    let (status, body) = get(&router, "/sentiment?subject=BitCoin&requester_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "bitcoin");
    assert_eq!(body["aggregate"]["sample_size"], 3);
    assert!(body["report"].as_str().unwrap().contains("BITCOIN"));
}

#[tokio::test]
async fn sentiment_resolves_aliases_and_handles_no_data() {
    let router = test_router();
    // "sol" resolves to "solana", which the static source has no items for.
    let (status, body) = get(&router, "/sentiment?subject=sol&requester_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "solana");
    assert_eq!(body["sample_size"], 0);
}

#[tokio::test]
async fn sentiment_rejects_invalid_subject() {
    let router = test_router();
    let (status, body) = get(&router, "/sentiment?subject=b!tc%2Fn&requester_id=u3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid input"));
}

#[tokio::test]
async fn sentiment_requires_requester_id() {
    let router = test_router();
    let (status, _) = get(&router, "/sentiment?subject=bitcoin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn throttle_returns_429_with_retry_hint() {
    let router = test_router();
    for _ in 0..2 {
        let (status, _) = get(&router, "/sentiment?subject=bitcoin&requester_id=limited").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = get(&router, "/sentiment?subject=bitcoin&requester_id=limited").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let retry = body["retry_after_seconds"].as_u64().unwrap();
    assert!(retry <= 60);

    // Other requesters are unaffected.
    let (status, _) = get(&router, "/sentiment?subject=bitcoin&requester_id=fresh").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn throttle_gates_before_subject_validation() {
    let router = test_router();

    // Invalid subjects spend a slot like any other request.
    for _ in 0..2 {
        let (status, _) = get(&router, "/sentiment?subject=b!tc&requester_id=spam").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    // At capacity the limiter answers first, even for a bad subject.
    let (status, _) = get(&router, "/sentiment?subject=b!tc&requester_id=spam").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let (status, _) = get(&router, "/sentiment?subject=bitcoin&requester_id=spam").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn score_batch_is_throttled_per_requester() {
    let router = test_router();
    let body = serde_json::json!({
        "requester_id": "batcher",
        "items": [{"text": "amazing", "weight": 3}, {"text": "bad", "weight": 1}],
    });
    let (status, out) = post_json(&router, "/score-batch", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["sample_size"], 2);
    assert_eq!(out["per_item_scores"].as_array().unwrap().len(), 2);

    let (_, _) = post_json(&router, "/score-batch", body.clone()).await;
    let (status, _) = post_json(&router, "/score-batch", body).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn track_untrack_watchlist_roundtrip() {
    let router = test_router();

    let (status, body) =
        post_json(&router, "/track", serde_json::json!({"subscriber_id": 7, "subject": "ETH"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "ethereum");
    assert_eq!(body["created"], true);

    // Tracking again is a no-op.
    let (_, body) =
        post_json(&router, "/track", serde_json::json!({"subscriber_id": 7, "subject": "eth"})).await;
    assert_eq!(body["created"], false);

    let (status, body) = get(&router, "/watchlist?subscriber_id=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subjects"], serde_json::json!(["ethereum"]));

    let (_, body) =
        post_json(&router, "/untrack", serde_json::json!({"subscriber_id": 7, "subject": "eth"})).await;
    assert_eq!(body["removed"], true);

    let (_, body) = get(&router, "/watchlist?subscriber_id=7").await;
    assert_eq!(body["subjects"], serde_json::json!([]));
}

#[tokio::test]
async fn direct_query_does_not_write_history() {
    let router = test_router();
    let (_, _) = get(&router, "/sentiment?subject=bitcoin&requester_id=nohist").await;
    let (status, body) = get(&router, "/debug/history?subject=bitcoin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}
