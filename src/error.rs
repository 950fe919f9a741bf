//! Error taxonomy for the engine.
//!
//! Each kind has one recovery policy: `InvalidInput` and `RateLimited`
//! surface synchronously to direct-query callers; `SourceUnavailable` skips
//! one subject for one pass; `StoreFailure` aborts one subject's pass after
//! the fetch; `DeliveryFailure` is isolated per subscriber. None of them is
//! fatal to a watchlist pass.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed subject identifier or batch; caller mistake, not an engine fault.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Request throttle denial. Normal control flow, not an exception path.
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Fetch failed or timed out for one subject during a pass.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// History append failed; the subject's run stops here for this pass.
    #[error("history store failure: {0}")]
    StoreFailure(String),

    /// One subscriber could not be notified; others are unaffected.
    #[error("delivery to subscriber {subscriber} failed: {reason}")]
    DeliveryFailure { subscriber: i64, reason: String },
}
