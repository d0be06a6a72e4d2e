//! Process-local memory tier.
//!
//! The cheapest tier and the first one checked. Entries live in a moka
//! LRU cache with a per-entry time-to-live (default 10 minutes), keyed on
//! `(content type, normalized key)`. Nothing here survives a restart.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::types::{ContentItem, ContentKey, ContentType};

/// Configuration for the memory tier.
///
/// ```rust
/// # use wanderlore::cache::MemoryConfig;
/// # use std::time::Duration;
/// let config = MemoryConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Maximum number of cached items. Default: 1,000.
    pub max_entries: u64,
    /// Time-to-live for each item. Default: 10 minutes.
    pub ttl: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached items.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached items.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

type MemoryKey = (ContentType, String);

/// In-memory tier holding shared, immutable items.
pub struct MemoryTier {
    cache: Cache<MemoryKey, Arc<ContentItem>>,
}

impl MemoryTier {
    pub fn new(config: &MemoryConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up an item. `None` on miss or expiry.
    pub async fn get(&self, content_type: ContentType, key: &ContentKey) -> Option<Arc<ContentItem>> {
        self.cache
            .get(&(content_type, key.as_str().to_string()))
            .await
    }

    /// Insert (or overwrite) an item under its own key and type.
    pub async fn put(&self, item: Arc<ContentItem>) {
        let key = (item.content_type(), item.key.clone());
        self.cache.insert(key, item).await;
    }

    /// Drop a single entry.
    pub async fn invalidate(&self, content_type: ContentType, key: &ContentKey) {
        self.cache
            .invalidate(&(content_type, key.as_str().to_string()))
            .await;
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Number of live entries, after flushing pending maintenance.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}
