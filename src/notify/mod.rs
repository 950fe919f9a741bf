//! Notification delivery seam and alert payload types.

pub mod telegram;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which way the sentiment moved relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increased => write!(f, "increased"),
            Direction::Decreased => write!(f, "decreased"),
        }
    }
}

/// One threshold breach, ready to fan out to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub subject: String,
    pub direction: Direction,
    pub previous_score: f64,
    pub current_score: f64,
}

/// Best-effort delivery transport. One call per subscriber; a failure for
/// one subscriber must not affect the others.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subscriber: i64, event: &AlertEvent) -> Result<()>;
}
