//! Append-only sentiment time series per subject.
//!
//! Records are immutable once written; the engine only appends and reads the
//! single most recent prior record. The append and the baseline lookup are
//! one trait operation so a caller cannot reorder them and accidentally read
//! its own just-written record as the baseline.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateResult;
use crate::error::EngineError;

/// One persisted observation for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Normalized lowercase subject identifier.
    pub subject: String,
    /// `mean_polarity` of the run that produced this record.
    pub score: f64,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub sample_size: usize,
    pub observed_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Build a record from one run's aggregate.
    pub fn from_aggregate(
        subject: impl Into<String>,
        agg: &AggregateResult,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            score: agg.mean_polarity,
            positive_pct: agg.positive_pct,
            negative_pct: agg.negative_pct,
            sample_size: agg.sample_size,
            observed_at,
        }
    }
}

/// Store seam. Implementations own the storage mechanics; the engine only
/// appends and reads backwards.
pub trait HistoryStore: Send + Sync {
    /// Append `record` and return the most recent record for the same
    /// subject that existed *before* this append, in one operation.
    ///
    /// An `Err` means the append itself failed and the caller must stop the
    /// subject's run. An implementation whose baseline lookup can fail
    /// independently of the append must log and return `Ok(None)` instead,
    /// so a broken read degrades to "no baseline" rather than losing the write.
    fn append_and_return_previous(
        &self,
        record: HistoryRecord,
    ) -> Result<Option<HistoryRecord>, EngineError>;

    /// Most recent record for `subject`, if any.
    fn most_recent(&self, subject: &str) -> Result<Option<HistoryRecord>, EngineError>;
}

/// In-memory store: per-subject vectors in append order. `observed_at` is
/// monotonically non-decreasing per subject because only the engine appends,
/// one record per subject per pass.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    inner: Mutex<HashMap<String, Vec<HistoryRecord>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last `n` records for a subject, oldest first. Debug surface only.
    pub fn snapshot_last_n(&self, subject: &str, n: usize) -> Vec<HistoryRecord> {
        let map = self.inner.lock().expect("history mutex poisoned");
        match map.get(subject) {
            None => Vec::new(),
            Some(rows) => {
                let start = rows.len().saturating_sub(n);
                rows[start..].to_vec()
            }
        }
    }

    /// Total number of stored records across subjects.
    pub fn len(&self) -> usize {
        let map = self.inner.lock().expect("history mutex poisoned");
        map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for InMemoryHistory {
    fn append_and_return_previous(
        &self,
        record: HistoryRecord,
    ) -> Result<Option<HistoryRecord>, EngineError> {
        let mut map = self.inner.lock().expect("history mutex poisoned");
        let rows = map.entry(record.subject.clone()).or_default();
        let previous = rows.last().cloned();
        rows.push(record);
        Ok(previous)
    }

    fn most_recent(&self, subject: &str) -> Result<Option<HistoryRecord>, EngineError> {
        let map = self.inner.lock().expect("history mutex poisoned");
        Ok(map.get(subject).and_then(|rows| rows.last().cloned()))
    }
}
