//! Session metrics snapshot.

use chrono::{DateTime, Utc};
use feed_fetch::FetchStats;
use feed_image::CacheStats;
use feed_model::SessionId;
use serde::Serialize;

/// Point-in-time view of one catalog session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedMetrics {
    pub session_id: SessionId,
    pub captured_at: DateTime<Utc>,
    pub term: String,
    pub page: u32,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fetch: FetchStats,
    /// Products fetched for the current term.
    pub products_accumulated: usize,
    /// Fetched products not in the cart.
    pub available: usize,
    /// Available products currently revealed.
    pub revealed: usize,
    pub cart_items: usize,
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub cache: CacheStats,
}

impl FeedMetrics {
    /// Fraction of cache lookups that were hits, if any were made.
    pub fn cache_hit_rate(&self) -> Option<f64> {
        let lookups = self.cache.hits + self.cache.misses;
        (lookups > 0).then(|| self.cache.hits as f64 / lookups as f64)
    }
}
