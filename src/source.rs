//! Text source seam: where raw batches come from.
//!
//! The concrete fetcher (network client, pagination, sticky/duplicate
//! filtering) lives outside this crate behind [`TextSource`]. The engine
//! treats a failed or empty fetch as "no data for this pass", never as a
//! fatal condition.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::aggregate::RawItem;

#[async_trait::async_trait]
pub trait TextSource: Send + Sync {
    /// Fetch up to `limit` recent items mentioning `subject`, no older than
    /// `since`. May return partial or empty results on source-side trouble.
    async fn fetch_batch(
        &self,
        subject: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawItem>>;

    fn name(&self) -> &'static str;
}

/// Fixed in-memory source keyed by subject. Stands in wherever a live
/// fetcher is not wired up (local runs, router tests).
#[derive(Debug, Default)]
pub struct StaticSource {
    by_subject: std::collections::HashMap<String, Vec<RawItem>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, subject: &str, items: Vec<RawItem>) -> Self {
        self.by_subject.insert(subject.to_string(), items);
        self
    }
}

#[async_trait::async_trait]
impl TextSource for StaticSource {
    async fn fetch_batch(
        &self,
        subject: &str,
        limit: usize,
        _since: DateTime<Utc>,
    ) -> Result<Vec<RawItem>> {
        let mut items = self.by_subject.get(subject).cloned().unwrap_or_default();
        items.truncate(limit);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
