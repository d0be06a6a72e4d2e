//! Daily generation budget.
//!
//! [`BudgetGuard`] counts generation calls per user per calendar day
//! against a fixed ceiling. The counter lives in the remote settings area
//! (`users/{uid}/settings/generation`, field `requestLimits`) so that it
//! follows the user across devices.
//!
//! # Contract
//!
//! - [`check()`](BudgetGuard::check) never writes. A counter stamped with
//!   an earlier day reads as a full budget; the reset itself is deferred
//!   to the next increment.
//! - [`increment()`](BudgetGuard::increment) is called once per answered
//!   generation call, never for cache reads. When it reaches the ceiling it
//!   records the next local midnight as `nextAvailableTime`.
//!
//! Days are calendar days in the configured UTC offset, not rolling 24 h
//! windows.
//!
//! If the counter cannot be loaded, the guard falls back to the last state
//! it saw in this process. Saving failures are logged; the in-process
//! snapshot still advances so one process cannot exceed the ceiling.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::cache::remote::{GENERATION_SETTINGS_ID, settings_path};
use crate::clock::Clock;
use crate::store::{DocumentStore, WriteMode};
use crate::types::{BudgetStatus, RequestLimits, SettingsDocument};
use crate::{Result, WanderloreError};

/// Default number of generation calls allowed per day.
pub const DEFAULT_DAILY_LIMIT: u32 = 10;

/// Configuration for the request budget.
///
/// ```rust
/// # use wanderlore::budget::BudgetConfig;
/// # use chrono::FixedOffset;
/// let config = BudgetConfig::new()
///     .daily_limit(5)
///     .utc_offset(FixedOffset::east_opt(9 * 3600).unwrap());
/// assert_eq!(config.daily_limit, 5);
/// ```
#[derive(Debug, Clone)]
pub struct BudgetConfig {
    /// Generation calls allowed per calendar day. Default: 10.
    pub daily_limit: u32,
    /// Offset used to decide where a calendar day starts. Default: the
    /// local offset at construction time.
    pub utc_offset: FixedOffset,
    /// Timeout for loading/saving the counter. Default: 10 seconds.
    pub timeout: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            utc_offset: *Local::now().offset(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl BudgetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the daily ceiling.
    pub fn daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    /// Set the offset that defines calendar days.
    pub fn utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Set the load/save timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Per-user daily quota for generation calls.
pub struct BudgetGuard {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    config: BudgetConfig,
    clock: Arc<dyn Clock>,
    snapshot: Mutex<RequestLimits>,
    write_lock: AsyncMutex<()>,
}

impl BudgetGuard {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        user_id: impl Into<String>,
        config: BudgetConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            config,
            clock,
            snapshot: Mutex::new(RequestLimits::default()),
            write_lock: AsyncMutex::new(()),
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.config.daily_limit
    }

    /// Report whether a generation call may proceed. Never mutates state.
    pub async fn check(&self) -> BudgetStatus {
        let limits = self.load().await;
        self.status_for(&limits)
    }

    /// Count one generation call and return the resulting status.
    pub async fn increment(&self) -> BudgetStatus {
        let _guard = self.write_lock.lock().await;
        let mut limits = self.load().await;
        let today = self.today();

        if limits.last_request_date == Some(today) {
            limits.request_count = limits.request_count.saturating_add(1);
        } else {
            limits = RequestLimits {
                request_count: 1,
                last_request_date: Some(today),
                next_available_time: None,
            };
        }
        if limits.request_count >= self.config.daily_limit {
            limits.next_available_time = Some(self.next_midnight());
        }

        debug!(
            user = %self.user_id,
            count = limits.request_count,
            limit = self.config.daily_limit,
            "generation budget incremented"
        );
        self.save(&limits).await;
        self.status_for(&limits)
    }

    /// Zero the counter (operator use).
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let limits = RequestLimits::default();
        self.store_snapshot(&limits);
        self.persist(&limits).await
    }

    fn status_for(&self, limits: &RequestLimits) -> BudgetStatus {
        let ceiling = self.config.daily_limit;
        if limits.last_request_date != Some(self.today()) {
            return BudgetStatus {
                can_request: ceiling > 0,
                requests_remaining: ceiling,
                next_available_time: None,
            };
        }

        let remaining = ceiling.saturating_sub(limits.request_count);
        let next_available_time = if remaining == 0 {
            Some(
                limits
                    .next_available_time
                    .unwrap_or_else(|| self.next_midnight()),
            )
        } else {
            None
        };
        BudgetStatus {
            can_request: remaining > 0,
            requests_remaining: remaining,
            next_available_time,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.config.utc_offset)
            .date_naive()
    }

    /// Start of the next calendar day, in UTC.
    fn next_midnight(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        self.today()
            .succ_opt()
            .map(|tomorrow| tomorrow.and_time(NaiveTime::MIN))
            .and_then(|midnight| midnight.and_local_timezone(self.config.utc_offset).single())
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| now + chrono::Duration::days(1))
    }

    async fn load(&self) -> RequestLimits {
        match self.fetch().await {
            Ok(Some(limits)) => {
                self.store_snapshot(&limits);
                limits
            }
            Ok(None) => self.current_snapshot(),
            Err(e) => {
                warn!(user = %self.user_id, error = %e, "failed to load request budget, using last known state");
                self.current_snapshot()
            }
        }
    }

    async fn fetch(&self) -> Result<Option<RequestLimits>> {
        let doc = tokio::time::timeout(
            self.config.timeout,
            self.store
                .get(&settings_path(&self.user_id), GENERATION_SETTINGS_ID),
        )
        .await
        .map_err(|_| WanderloreError::Timeout(self.config.timeout))??;

        match doc {
            Some(doc) => {
                let settings: SettingsDocument = serde_json::from_value(doc)?;
                Ok(settings.request_limits)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, limits: &RequestLimits) {
        self.store_snapshot(limits);
        if let Err(e) = self.persist(limits).await {
            warn!(user = %self.user_id, error = %e, "failed to save request budget");
        }
    }

    async fn persist(&self, limits: &RequestLimits) -> Result<()> {
        let update = SettingsDocument {
            request_limits: Some(limits.clone()),
            ..Default::default()
        };
        let doc = serde_json::to_value(&update)?;
        tokio::time::timeout(
            self.config.timeout,
            self.store.set(
                &settings_path(&self.user_id),
                GENERATION_SETTINGS_ID,
                doc,
                WriteMode::Merge,
            ),
        )
        .await
        .map_err(|_| WanderloreError::Timeout(self.config.timeout))?
    }

    fn current_snapshot(&self) -> RequestLimits {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store_snapshot(&self, limits: &RequestLimits) {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = limits.clone();
    }
}
