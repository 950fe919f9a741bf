//! # Alert Decision Engine
//! One pass per scheduled trigger: for every watched subject, fetch a batch,
//! aggregate it, persist the observation, compare against the baseline, and
//! fan alerts out to subscribers.
//!
//! Per-subject order is strict (fetch → score → persist → decide → alert):
//! the baseline comes back from the same store call that appends the current
//! record, so a run can never read its own write as "previous". Failures are
//! handled where they happen: a dead source or store skips one subject, a
//! failed delivery skips one subscriber, and the pass always continues.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};

use crate::aggregate::{aggregate, AggregateResult};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::history::{HistoryRecord, HistoryStore};
use crate::notify::{AlertEvent, Direction, Notifier};
use crate::sentiment::PolarityScorer;
use crate::source::TextSource;
use crate::watchlist::WatchlistRegistry;

/// Terminal state of one subject's run within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Empty batch: absence of data is not a signal. Nothing written.
    Skipped,
    /// First observation ever; recorded, nothing to compare against.
    NoBaseline,
    /// Recorded, delta below threshold.
    NoChange,
    /// Recorded and breached; alerts fanned out.
    Alerted { notified: usize, failed: usize },
}

/// Pure threshold policy: `Some(direction)` on a breach, `None` otherwise.
pub fn decide(current_mean: f64, previous_score: f64, threshold: f64) -> Option<Direction> {
    let delta = (current_mean - previous_score).abs();
    if delta < threshold {
        return None;
    }
    Some(if current_mean > previous_score {
        Direction::Increased
    } else {
        Direction::Decreased
    })
}

pub struct AlertEngine {
    scorer: PolarityScorer,
    source: Arc<dyn TextSource>,
    history: Arc<dyn HistoryStore>,
    watchlist: Arc<dyn WatchlistRegistry>,
    notifier: Arc<dyn Notifier>,
    alert_threshold: f64,
    post_limit: usize,
    recency_window: chrono::Duration,
    fetch_timeout: Duration,
}

impl AlertEngine {
    pub fn new(
        scorer: PolarityScorer,
        source: Arc<dyn TextSource>,
        history: Arc<dyn HistoryStore>,
        watchlist: Arc<dyn WatchlistRegistry>,
        notifier: Arc<dyn Notifier>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            scorer,
            source,
            history,
            watchlist,
            notifier,
            alert_threshold: config.alert_threshold,
            post_limit: config.post_limit,
            recency_window: chrono::Duration::hours(config.recency_window_hours as i64),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Direct synchronous query path: score a batch without touching
    /// history. Throttling happens upstream in the API layer.
    pub fn score_batch(&self, items: &[crate::aggregate::RawItem]) -> AggregateResult {
        aggregate(&self.scorer, items)
    }

    /// Run the decision state machine over every distinct watched subject.
    /// Side effects only; per-subject failures are logged and the loop
    /// continues.
    pub async fn run_watchlist_pass(&self) {
        crate::metrics::ensure_engine_series_described();

        let subjects = match self.watchlist.distinct_subjects() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "watchlist lookup failed, skipping pass");
                return;
            }
        };
        if subjects.is_empty() {
            tracing::debug!("no subjects on any watchlist, skipping pass");
            return;
        }

        for subject in &subjects {
            counter!("engine_subjects_checked_total").increment(1);
            match self.check_subject(subject).await {
                Ok(PassOutcome::Skipped) => {
                    counter!("engine_subjects_skipped_total").increment(1);
                    tracing::debug!(subject = %subject, "no data this pass");
                }
                Ok(PassOutcome::NoBaseline) => {
                    tracing::info!(subject = %subject, "first observation recorded");
                }
                Ok(PassOutcome::NoChange) => {
                    tracing::debug!(subject = %subject, "recorded, below threshold");
                }
                Ok(PassOutcome::Alerted { notified, failed }) => {
                    counter!("engine_alerts_total").increment(1);
                    tracing::info!(subject = %subject, notified, failed, "alert fanned out");
                }
                Err(e) => {
                    counter!("engine_subject_errors_total").increment(1);
                    tracing::warn!(subject = %subject, error = %e, "subject check failed");
                }
            }
        }

        counter!("engine_passes_total").increment(1);
        gauge!("engine_last_pass_ts").set(Utc::now().timestamp().max(0) as f64);
    }

    /// One subject, one pass: fetch → score → persist → decide → alert.
    pub async fn check_subject(&self, subject: &str) -> Result<PassOutcome, EngineError> {
        let since = Utc::now() - self.recency_window;
        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_batch(subject, self.post_limit, since),
        )
        .await;

        let items = match fetched {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => return Err(EngineError::SourceUnavailable(format!("{e:#}"))),
            Err(_) => {
                return Err(EngineError::SourceUnavailable(format!(
                    "fetch timed out after {}s",
                    self.fetch_timeout.as_secs()
                )))
            }
        };
        if items.is_empty() {
            return Ok(PassOutcome::Skipped);
        }

        let current = aggregate(&self.scorer, &items);

        // Persist unconditionally once data exists; the time series must not
        // gap just because no alert fires. The baseline comes back from the
        // same call.
        let record = HistoryRecord::from_aggregate(subject, &current, Utc::now());
        let previous = self.history.append_and_return_previous(record)?;

        let Some(previous) = previous else {
            return Ok(PassOutcome::NoBaseline);
        };

        let Some(direction) = decide(current.mean_polarity, previous.score, self.alert_threshold)
        else {
            return Ok(PassOutcome::NoChange);
        };

        let event = AlertEvent {
            subject: subject.to_string(),
            direction,
            previous_score: previous.score,
            current_score: current.mean_polarity,
        };

        let subscribers = self.watchlist.subscribers_for(subject)?;
        let mut notified = 0usize;
        let mut failed = 0usize;
        for subscriber in subscribers {
            match self.notifier.notify(subscriber, &event).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    failed += 1;
                    counter!("engine_deliveries_failed_total").increment(1);
                    let err = EngineError::DeliveryFailure {
                        subscriber,
                        reason: format!("{e:#}"),
                    };
                    tracing::warn!(subject, error = %err, "delivery failed");
                }
            }
        }

        Ok(PassOutcome::Alerted { notified, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_upward_is_increased() {
        assert_eq!(decide(0.5, -0.2, 0.3), Some(Direction::Increased));
    }

    #[test]
    fn breach_downward_is_decreased() {
        assert_eq!(decide(-0.4, 0.1, 0.3), Some(Direction::Decreased));
    }

    #[test]
    fn small_delta_is_quiet() {
        assert_eq!(decide(0.12, 0.1, 0.3), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(decide(0.4, 0.1, 0.3), Some(Direction::Increased));
    }
}
