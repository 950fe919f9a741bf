//! Watchlist registry: which subjects are tracked, and by whom.
//!
//! The engine consumes this read-only: `distinct_subjects` drives the
//! scheduled pass, `subscribers_for` drives alert fan-out. Mutation
//! (track/untrack) is the admin surface's business and lives on the concrete
//! in-memory implementation.

use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::error::EngineError;

/// Read-only lookup consumed by the alert engine. Subjects are already
/// case-normalized strings; two subjects are equal iff the strings are.
pub trait WatchlistRegistry: Send + Sync {
    /// Every subject at least one subscriber tracks.
    fn distinct_subjects(&self) -> Result<Vec<String>, EngineError>;

    /// Subscriber ids tracking `subject`.
    fn subscribers_for(&self, subject: &str) -> Result<Vec<i64>, EngineError>;
}

/// In-memory registry over unique `(subscriber, subject)` pairs. BTreeSet
/// keeps iteration order deterministic for tests and debug output.
#[derive(Debug, Default)]
pub struct InMemoryWatchlist {
    entries: Mutex<BTreeSet<(i64, String)>>,
}

impl InMemoryWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair; returns false if the subscriber already tracks the subject.
    pub fn track(&self, subscriber: i64, subject: &str) -> bool {
        let mut entries = self.entries.lock().expect("watchlist mutex poisoned");
        entries.insert((subscriber, subject.to_string()))
    }

    /// Remove a pair; returns false if it was not tracked.
    pub fn untrack(&self, subscriber: i64, subject: &str) -> bool {
        let mut entries = self.entries.lock().expect("watchlist mutex poisoned");
        entries.remove(&(subscriber, subject.to_string()))
    }

    /// Subjects one subscriber tracks, sorted.
    pub fn subjects_for(&self, subscriber: i64) -> Vec<String> {
        let entries = self.entries.lock().expect("watchlist mutex poisoned");
        entries
            .iter()
            .filter(|(id, _)| *id == subscriber)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("watchlist mutex poisoned").len()
    }
}

impl WatchlistRegistry for InMemoryWatchlist {
    fn distinct_subjects(&self) -> Result<Vec<String>, EngineError> {
        let entries = self.entries.lock().expect("watchlist mutex poisoned");
        let set: BTreeSet<&str> = entries.iter().map(|(_, s)| s.as_str()).collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }

    fn subscribers_for(&self, subject: &str) -> Result<Vec<i64>, EngineError> {
        let entries = self.entries.lock().expect("watchlist mutex poisoned");
        Ok(entries
            .iter()
            .filter(|(_, s)| s == subject)
            .map(|(id, _)| *id)
            .collect())
    }
}
