use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

use wanderlore::budget::{BudgetConfig, BudgetGuard};
use wanderlore::clock::ManualClock;
use wanderlore::store::{DocumentStore, MemoryDocumentStore, WriteMode};
use wanderlore::{Result, WanderloreError};

const SETTINGS: &str = "users/user-1/settings";

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn guard(
    store: Arc<dyn DocumentStore>,
    clock: Arc<ManualClock>,
    limit: u32,
    offset: FixedOffset,
) -> BudgetGuard {
    BudgetGuard::new(
        store,
        "user-1",
        BudgetConfig::new().daily_limit(limit).utc_offset(offset),
        clock,
    )
}

#[tokio::test]
async fn ceiling_of_five_blocks_sixth_request() {
    let store = Arc::new(MemoryDocumentStore::new());
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(store, clock, 5, utc());

    for _ in 0..5 {
        assert!(guard.check().await.can_request);
        guard.increment().await;
    }

    let status = guard.check().await;
    assert!(!status.can_request);
    assert_eq!(status.requests_remaining, 0);
    assert_eq!(status.next_available_time, Some(at(2024, 5, 2, 0)));
}

#[tokio::test]
async fn ceiling_persists_next_midnight() {
    let store = Arc::new(MemoryDocumentStore::new());
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(store.clone(), clock, 2, utc());

    guard.increment().await;
    guard.increment().await;

    let doc = store.get(SETTINGS, "generation").await.unwrap().unwrap();
    let limits = &doc["requestLimits"];
    assert_eq!(limits["requestCount"], 2);
    assert_eq!(limits["lastRequestDate"], "2024-05-01");
    let next: DateTime<Utc> = serde_json::from_value(limits["nextAvailableTime"].clone()).unwrap();
    assert_eq!(next, at(2024, 5, 2, 0));
}

#[tokio::test]
async fn yesterday_at_ceiling_reads_as_full_budget() {
    let store = Arc::new(MemoryDocumentStore::new());
    store
        .set(
            SETTINGS,
            "generation",
            json!({"requestLimits": {
                "requestCount": 5,
                "lastRequestDate": "2024-04-30",
                "nextAvailableTime": "2024-05-01T00:00:00Z"
            }}),
            WriteMode::Replace,
        )
        .await
        .unwrap();
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(store.clone(), clock, 5, utc());

    let status = guard.check().await;
    assert!(status.can_request);
    assert_eq!(status.requests_remaining, 5);
    assert_eq!(status.next_available_time, None);

    // check() did not reset anything
    let doc = store.get(SETTINGS, "generation").await.unwrap().unwrap();
    assert_eq!(doc["requestLimits"]["requestCount"], 5);

    // the first increment of the day starts over at one
    let status = guard.increment().await;
    assert_eq!(status.requests_remaining, 4);
    let doc = store.get(SETTINGS, "generation").await.unwrap().unwrap();
    assert_eq!(doc["requestLimits"]["requestCount"], 1);
    assert_eq!(doc["requestLimits"]["lastRequestDate"], "2024-05-01");
}

#[tokio::test]
async fn rollover_follows_calendar_day_not_24_hours() {
    let store = Arc::new(MemoryDocumentStore::new());
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 23)));
    let guard = guard(store, clock.clone(), 1, utc());

    guard.increment().await;
    assert!(!guard.check().await.can_request);

    // Two hours later it is a new calendar day.
    clock.advance(chrono::Duration::hours(2));
    assert!(guard.check().await.can_request);
}

#[tokio::test]
async fn calendar_day_uses_configured_offset() {
    let store = Arc::new(MemoryDocumentStore::new());
    // 22:00 UTC on May 1st is already May 2nd in UTC+3.
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 22)));
    let guard = guard(store.clone(), clock, 1, FixedOffset::east_opt(3 * 3600).unwrap());

    let status = guard.increment().await;
    assert!(!status.can_request);
    // Next local midnight is May 3rd 00:00 +03:00.
    assert_eq!(status.next_available_time, Some(at(2024, 5, 2, 21)));

    let doc = store.get(SETTINGS, "generation").await.unwrap().unwrap();
    let date: NaiveDate =
        serde_json::from_value(doc["requestLimits"]["lastRequestDate"].clone()).unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
}

#[tokio::test]
async fn budget_merges_into_settings_document() {
    let store = Arc::new(MemoryDocumentStore::new());
    store
        .set(
            SETTINGS,
            "generation",
            json!({"lastUpdatedAt": 1_700_000_000_000_i64}),
            WriteMode::Replace,
        )
        .await
        .unwrap();
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(store.clone(), clock, 3, utc());

    guard.increment().await;

    let doc = store.get(SETTINGS, "generation").await.unwrap().unwrap();
    assert_eq!(doc["lastUpdatedAt"], 1_700_000_000_000_i64);
    assert_eq!(doc["requestLimits"]["requestCount"], 1);
}

#[tokio::test]
async fn reset_clears_counter() {
    let store = Arc::new(MemoryDocumentStore::new());
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(store, clock, 1, utc());

    guard.increment().await;
    assert!(!guard.check().await.can_request);

    guard.reset().await.unwrap();
    let status = guard.check().await;
    assert!(status.can_request);
    assert_eq!(status.requests_remaining, 1);
}

// ============================================================================
// Failing store
// ============================================================================

/// Document store that fails every call.
struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Value>> {
        Err(WanderloreError::Network("connection refused".into()))
    }

    async fn set(&self, _c: &str, _id: &str, _doc: Value, _mode: WriteMode) -> Result<()> {
        Err(WanderloreError::Network("connection refused".into()))
    }

    async fn list(&self, _collection: &str) -> Result<Vec<(String, Value)>> {
        Err(WanderloreError::Network("connection refused".into()))
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<()> {
        Err(WanderloreError::Network("connection refused".into()))
    }
}

#[tokio::test]
async fn unreachable_store_falls_back_to_last_known_state() {
    let clock = Arc::new(ManualClock::new(at(2024, 5, 1, 9)));
    let guard = guard(Arc::new(UnreachableStore), clock, 2, utc());

    assert!(guard.check().await.can_request);
    guard.increment().await;
    guard.increment().await;

    // Counter could not be saved, but this process still enforces it.
    let status = guard.check().await;
    assert!(!status.can_request);
    assert!(guard.reset().await.is_err());
}
