//! The content cache: tier chain, write-through and batch lookups.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::cache::{LocalTier, MemoryTier, RemoteTier};
use crate::clock::Clock;
use crate::generation::GenerationGateway;
use crate::normalize::normalize;
use crate::telemetry;
use crate::types::{BudgetStatus, ContentItem, ContentKey, ContentType};

/// Default remote freshness window.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

type InFlightKey = (ContentType, String);

/// Tiered cache for generated travel content.
///
/// Created through [`Wanderlore::builder()`](super::Wanderlore::builder).
/// Lookups go Memory → Local → Remote (when fresh) → generation, strictly
/// in that order, and every hit is written through to the faster tiers.
///
/// Only budget and generation failures reach the caller. Tier failures are
/// logged and treated as misses.
///
/// Concurrent calls for the same `(type, key)` are serialised, so the
/// second caller finds the first caller's result instead of generating
/// again.
pub struct ContentCache {
    pub(super) memory: MemoryTier,
    pub(super) local: LocalTier,
    pub(super) remote: RemoteTier,
    pub(super) gateway: GenerationGateway,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) refresh_interval: Duration,
    pub(super) in_flight: Mutex<HashMap<InFlightKey, Arc<AsyncMutex<()>>>>,
}

impl ContentCache {
    /// Fetch content for a raw location label.
    ///
    /// Fails with [`RateLimitExceeded`](crate::WanderloreError::RateLimitExceeded)
    /// when generation is needed but the daily budget is spent, or
    /// [`Generation`](crate::WanderloreError::Generation) when the backend
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_content(
        &self,
        raw_key: &str,
        content_type: ContentType,
    ) -> Result<Arc<ContentItem>> {
        let key = normalize(raw_key);
        self.get_normalized(&key, content_type).await
    }

    /// Fetch content for many labels.
    ///
    /// Labels that normalize to the same key are fetched once. Keys are
    /// processed one after another; a key that fails is logged and left out
    /// of the result. The display names requested are recorded as the
    /// user's explorable regions.
    #[instrument(skip(self, raw_keys), fields(count = raw_keys.len()))]
    pub async fn get_content_for_many<S: AsRef<str>>(
        &self,
        raw_keys: &[S],
        content_type: ContentType,
    ) -> Vec<Arc<ContentItem>> {
        let mut seen = HashSet::new();
        let keys: Vec<ContentKey> = raw_keys
            .iter()
            .map(|raw| normalize(raw.as_ref()))
            .filter(|key| seen.insert(key.as_str().to_string()))
            .collect();

        let mut items = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.get_normalized(key, content_type).await {
                Ok(item) => items.push(item),
                Err(e) => warn!(key = %key, error = %e, "skipping key in batch"),
            }
        }

        let regions: Vec<String> = keys
            .iter()
            .filter(|key| !key.is_unknown())
            .map(|key| key.display().to_string())
            .collect();
        if let Err(e) = self
            .remote
            .record_explorable_regions(content_type, &regions)
            .await
        {
            warn!(error = %e, "failed to record explorable regions");
        }

        items
    }

    /// Current budget, for rendering "N left" or "try again at X".
    pub async fn budget_status(&self) -> BudgetStatus {
        self.gateway.budget().check().await
    }

    /// Zero the daily budget.
    pub async fn reset_budget(&self) -> Result<()> {
        self.gateway.budget().reset().await
    }

    /// Empty the memory and local tiers for every content type.
    pub async fn clear_all(&self) -> Result<()> {
        self.memory.clear();
        for content_type in ContentType::ALL {
            self.local.clear(content_type).await?;
        }
        Ok(())
    }

    /// Delete the user's remote items and freshness stamp for a type.
    pub async fn clear_remote(&self, content_type: ContentType) -> Result<()> {
        self.remote.clear(content_type).await
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    pub fn local(&self) -> &LocalTier {
        &self.local
    }

    pub fn remote(&self) -> &RemoteTier {
        &self.remote
    }

    async fn get_normalized(
        &self,
        key: &ContentKey,
        content_type: ContentType,
    ) -> Result<Arc<ContentItem>> {
        if let Some(item) = self.memory.get(content_type, key).await {
            record_hit("memory", content_type);
            return Ok(item);
        }

        let lock = self.key_lock(content_type, key);
        let result = {
            let _guard = lock.lock().await;
            self.resolve(key, content_type).await
        };
        self.release_key_lock(content_type, key, &lock);
        result
    }

    /// Steps after the memory fast path. Runs under the per-key lock.
    async fn resolve(&self, key: &ContentKey, content_type: ContentType) -> Result<Arc<ContentItem>> {
        // A caller we waited on may have filled memory.
        if let Some(item) = self.memory.get(content_type, key).await {
            record_hit("memory", content_type);
            return Ok(item);
        }
        record_miss("memory", content_type);

        match self.local.get(content_type, key).await {
            Ok(Some(item)) => {
                record_hit("local", content_type);
                let item = Arc::new(item);
                self.memory.put(item.clone()).await;
                return Ok(item);
            }
            Ok(None) => record_miss("local", content_type),
            Err(e) => {
                warn!(key = %key, error = %e, "local tier read failed, treating as miss");
                record_miss("local", content_type);
            }
        }

        match self.remote.find(content_type, key).await {
            Ok(Some(item)) => {
                if self.remote_is_fresh(content_type).await {
                    record_hit("remote", content_type);
                    self.write_local(&item).await;
                    let item = Arc::new(item);
                    self.memory.put(item.clone()).await;
                    return Ok(item);
                }
                debug!(key = %key, "remote copy is stale");
                metrics::counter!(
                    telemetry::STALE_REMOTE_TOTAL,
                    "content_type" => content_type.as_str(),
                )
                .increment(1);
                record_miss("remote", content_type);
            }
            Ok(None) => record_miss("remote", content_type),
            Err(e) => {
                warn!(key = %key, error = %e, "remote tier read failed, treating as miss");
                record_miss("remote", content_type);
            }
        }

        let item = self.gateway.generate(key, content_type).await?;

        if let Err(e) = self.remote.upsert(&item).await {
            warn!(key = %key, error = %e, "failed to write generated content to remote tier");
        }
        self.write_local(&item).await;
        let item = Arc::new(item);
        self.memory.put(item.clone()).await;
        Ok(item)
    }

    /// Whether the remote tier was written within the refresh interval.
    /// An unreadable or missing stamp counts as stale.
    async fn remote_is_fresh(&self, content_type: ContentType) -> bool {
        match self.remote.freshness(content_type).await {
            Ok(Some(stamp)) => match (self.clock.now() - stamp).to_std() {
                Ok(age) => age <= self.refresh_interval,
                // Stamp in the future: clock skew, not staleness.
                Err(_) => true,
            },
            Ok(None) => false,
            Err(e) => {
                warn!(%content_type, error = %e, "failed to read remote freshness");
                false
            }
        }
    }

    async fn write_local(&self, item: &ContentItem) {
        if let Err(e) = self.local.put(item).await {
            warn!(key = %item.key, error = %e, "failed to write local tier");
        }
    }

    fn key_lock(&self, content_type: ContentType, key: &ContentKey) -> Arc<AsyncMutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight
            .entry((content_type, key.as_str().to_string()))
            .or_default()
            .clone()
    }

    fn release_key_lock(&self, content_type: ContentType, key: &ContentKey, lock: &Arc<AsyncMutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this caller hold it: nobody else is waiting.
        if Arc::strong_count(lock) <= 2 {
            in_flight.remove(&(content_type, key.as_str().to_string()));
        }
    }
}

fn record_hit(tier: &'static str, content_type: ContentType) {
    debug!(tier, %content_type, "cache hit");
    metrics::counter!(
        telemetry::TIER_HITS_TOTAL,
        "tier" => tier,
        "content_type" => content_type.as_str(),
    )
    .increment(1);
}

fn record_miss(tier: &'static str, content_type: ContentType) {
    metrics::counter!(
        telemetry::TIER_MISSES_TOTAL,
        "tier" => tier,
        "content_type" => content_type.as_str(),
    )
    .increment(1);
}
