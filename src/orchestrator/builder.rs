//! Builder for configuring content cache instances

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use super::cache::{ContentCache, DEFAULT_REFRESH_INTERVAL};
use crate::budget::{BudgetConfig, BudgetGuard};
use crate::cache::{DEFAULT_REMOTE_TIMEOUT, LocalTier, MemoryConfig, MemoryTier, RemoteTier};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, Secrets};
use crate::generation::{
    DEFAULT_GENERATION_TIMEOUT, GeminiBackend, GenerationBackend, GenerationGateway, RetryConfig,
    RetryingBackend,
};
use crate::store::{
    DocumentStore, FileKeyValueStore, HttpDocumentStore, KeyValueStore, MemoryDocumentStore,
    default_store_dir,
};
use crate::{Result, WanderloreError};

/// User id used when none is configured.
pub const DEFAULT_USER_ID: &str = "local";

/// Main entry point for creating content caches.
pub struct Wanderlore;

impl Wanderlore {
    /// Create a new builder for configuring the cache.
    pub fn builder() -> WanderloreBuilder {
        WanderloreBuilder::new()
    }
}

/// Builder for [`ContentCache`].
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use wanderlore::{Wanderlore, store::{MemoryDocumentStore, MemoryKeyValueStore}};
/// # use wanderlore::generation::GeminiBackend;
/// # fn main() -> wanderlore::Result<()> {
/// let cache = Wanderlore::builder()
///     .user_id("traveller-42")
///     .local_store(Arc::new(MemoryKeyValueStore::new()))
///     .remote_store(Arc::new(MemoryDocumentStore::new()))
///     .backend(Arc::new(GeminiBackend::new("api-key", "gemini-1.5-flash")?))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct WanderloreBuilder {
    user_id: Option<String>,
    local_store: Option<Arc<dyn KeyValueStore>>,
    remote_store: Option<Arc<dyn DocumentStore>>,
    backend: Option<Arc<dyn GenerationBackend>>,
    clock: Arc<dyn Clock>,
    memory: MemoryConfig,
    budget: BudgetConfig,
    retry: Option<RetryConfig>,
    refresh_interval: Duration,
    remote_timeout: Duration,
    generation_timeout: Duration,
}

impl Default for WanderloreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WanderloreBuilder {
    pub fn new() -> Self {
        Self {
            user_id: None,
            local_store: None,
            remote_store: None,
            backend: None,
            clock: Arc::new(SystemClock),
            memory: MemoryConfig::default(),
            budget: BudgetConfig::default(),
            retry: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Configure everything from a loaded [`Config`] and [`Secrets`].
    ///
    /// Without `remote.base_url` the remote tier and budget live in memory
    /// for the lifetime of the process.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        let api_key = secrets.gemini_api_key().ok_or_else(|| {
            WanderloreError::Configuration(
                "No generation API key. Set [gemini] api_key in secrets.toml or GEMINI_API_KEY"
                    .to_string(),
            )
        })?;
        let generation_timeout = Duration::from_secs(config.generation.timeout_secs);
        let mut backend = GeminiBackend::with_base_url(
            api_key,
            &config.generation.model,
            &config.generation.base_url,
            generation_timeout,
        )?;
        if let Some(temperature) = config.generation.temperature {
            backend = backend.temperature(temperature);
        }

        let remote_timeout = Duration::from_secs(config.remote.timeout_secs);
        let remote_store: Arc<dyn DocumentStore> = match &config.remote.base_url {
            Some(base_url) => Arc::new(HttpDocumentStore::with_timeout(
                base_url,
                secrets.remote_token(),
                remote_timeout,
            )?),
            None => {
                warn!("no remote.base_url configured, remote state will not persist");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let local_dir = config
            .cache
            .local_dir
            .clone()
            .unwrap_or_else(default_store_dir);

        Ok(Self::new()
            .user_id(
                config
                    .remote
                    .user_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            )
            .local_store(Arc::new(FileKeyValueStore::new(local_dir)))
            .remote_store(remote_store)
            .backend(Arc::new(backend))
            .memory_config(config.cache.memory_config())
            .budget_config(config.budget.budget_config()?.timeout(remote_timeout))
            .retry(config.generation.retry.retry_config())
            .refresh_interval(config.cache.refresh_interval())
            .remote_timeout(remote_timeout)
            .generation_timeout(generation_timeout))
    }

    /// User whose remote documents and budget are used.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Store backing the local tier.
    pub fn local_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    /// Store backing the remote tier and the budget counter.
    pub fn remote_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.remote_store = Some(store);
        self
    }

    /// Generation backend.
    pub fn backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Time source (tests use [`ManualClock`](crate::clock::ManualClock)).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn memory_config(mut self, config: MemoryConfig) -> Self {
        self.memory = config;
        self
    }

    pub fn budget_config(mut self, config: BudgetConfig) -> Self {
        self.budget = config;
        self
    }

    /// Wrap the backend in a [`RetryingBackend`].
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// How long remote content stays usable after the last remote write.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Build the cache.
    ///
    /// Fails with [`Configuration`](WanderloreError::Configuration) when
    /// the user id, a store or the backend is missing.
    pub fn build(self) -> Result<ContentCache> {
        let user_id = self
            .user_id
            .ok_or_else(|| WanderloreError::Configuration("no user id configured".into()))?;
        let local_store = self
            .local_store
            .ok_or_else(|| WanderloreError::Configuration("no local store configured".into()))?;
        let remote_store = self
            .remote_store
            .ok_or_else(|| WanderloreError::Configuration("no remote store configured".into()))?;
        let mut backend = self.backend.ok_or_else(|| {
            WanderloreError::Configuration("no generation backend configured".into())
        })?;
        if let Some(retry) = self.retry.filter(|r| r.max_attempts > 1) {
            backend = Arc::new(RetryingBackend::new(backend, retry));
        }

        let budget = Arc::new(BudgetGuard::new(
            remote_store.clone(),
            user_id.clone(),
            self.budget,
            self.clock.clone(),
        ));

        Ok(ContentCache {
            memory: MemoryTier::new(&self.memory),
            local: LocalTier::new(local_store),
            remote: RemoteTier::new(
                remote_store,
                user_id,
                self.remote_timeout,
                self.clock.clone(),
            ),
            gateway: GenerationGateway::new(backend, budget, self.clock.clone())
                .with_timeout(self.generation_timeout),
            clock: self.clock,
            refresh_interval: self.refresh_interval,
            in_flight: Mutex::new(HashMap::new()),
        })
    }
}
