//! Per-requester sliding-window request throttle.
//!
//! Guards the expensive direct-query scoring path; the scheduled watchlist
//! pass is system-triggered and does not go through here. The clock is
//! injected so tests control time deterministically, and the whole map sits
//! behind one mutex so purge-then-append is atomic per check and concurrent
//! callers for the same requester cannot overshoot the capacity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time source seam for deterministic tests.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Sliding-window limiter: at most `capacity` requests per requester within
/// the trailing `window_secs`. Denied attempts are not recorded. State is
/// created lazily per requester and lives for the process lifetime.
pub struct RequestThrottle {
    capacity: usize,
    window_secs: u64,
    clock: Arc<dyn Clock>,
    requests: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestThrottle {
    pub const DEFAULT_CAPACITY: usize = 10;
    pub const DEFAULT_WINDOW_SECS: u64 = 60;

    pub fn new(capacity: usize, window_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: capacity.max(1),
            window_secs: window_secs.max(1),
            clock,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Defaults (10 requests / 60 s) on the system clock.
    pub fn with_defaults() -> Self {
        Self::new(
            Self::DEFAULT_CAPACITY,
            Self::DEFAULT_WINDOW_SECS,
            Arc::new(SystemClock),
        )
    }

    /// Purge expired timestamps, then admit and record the request unless the
    /// requester is already at capacity.
    pub fn allow(&self, requester_id: &str) -> bool {
        let now = self.clock.now_unix();
        let window_start = now.saturating_sub(self.window_secs);

        let mut map = self.requests.lock().expect("throttle mutex poisoned");
        let entry = map.entry(requester_id.to_string()).or_default();
        entry.retain(|&ts| ts > window_start);

        if entry.len() >= self.capacity {
            return false;
        }
        entry.push(now);
        true
    }

    /// Seconds until the oldest recorded request falls out of the window;
    /// 0 when nothing is recorded.
    pub fn reset_seconds(&self, requester_id: &str) -> u64 {
        let now = self.clock.now_unix();
        let map = self.requests.lock().expect("throttle mutex poisoned");
        match map.get(requester_id).and_then(|v| v.iter().min()) {
            None => 0,
            Some(&oldest) => (oldest + self.window_secs).saturating_sub(now),
        }
    }

    /// Combined check for the API layer: `(allowed, retry_after_secs)`.
    pub fn check(&self, requester_id: &str) -> (bool, u64) {
        if self.allow(requester_id) {
            (true, 0)
        } else {
            (false, self.reset_seconds(requester_id))
        }
    }
}
