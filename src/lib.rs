// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod normalize;
pub mod report;
pub mod scheduler;
pub mod sentiment;
pub mod source;
pub mod subject;
pub mod throttle;
pub mod watchlist;

// Notifications
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AggregateResult, RawItem};
pub use crate::api::{create_router, AppState};
pub use crate::engine::{AlertEngine, PassOutcome};
pub use crate::error::EngineError;
pub use crate::notify::{AlertEvent, Direction, Notifier};
pub use crate::sentiment::PolarityScorer;
