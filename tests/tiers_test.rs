use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use wanderlore::cache::{LocalTier, RemoteTier};
use wanderlore::clock::ManualClock;
use wanderlore::store::{DocumentStore, KeyValueStore, MemoryDocumentStore, MemoryKeyValueStore, WriteMode};
use wanderlore::{
    ContentItem, ContentPayload, ContentType, CulturalInsight, Quiz, QuizQuestion, Result,
    WanderloreError, normalize,
};

fn insight_item(raw: &str) -> ContentItem {
    let key = normalize(raw);
    let payload = ContentPayload::CulturalInsight(CulturalInsight {
        region: key.display().to_string(),
        customs: vec!["Greet shopkeepers".into()],
        etiquette: "Dress modestly in churches.".into(),
        dining_tips: "Lunch is the main meal.".into(),
        restaurants: vec![],
        bars: vec![],
        local_tips: vec!["Walk everywhere.".into()],
    });
    ContentItem::new(&key, payload, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

fn quiz_item(raw: &str) -> ContentItem {
    let key = normalize(raw);
    let payload = ContentPayload::Quiz(Quiz {
        title: format!("{} quiz", key.display()),
        description: "Trivia".into(),
        questions: vec![QuizQuestion {
            question: "Q?".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: 1,
            explanation: "Because b.".into(),
        }],
    });
    ContentItem::new(&key, payload, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

// ============================================================================
// Local tier
// ============================================================================

#[tokio::test]
async fn local_put_then_get() {
    let tier = LocalTier::new(Arc::new(MemoryKeyValueStore::new()));
    let item = insight_item("Seville, Spain");
    tier.put(&item).await.unwrap();

    let found = tier
        .get(ContentType::CulturalInsight, &normalize("Seville"))
        .await
        .unwrap();
    assert_eq!(found, Some(item));
    assert!(
        tier.get(ContentType::Quiz, &normalize("Seville"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn local_malformed_entry_is_removed() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store.set("quizzes:oslo", "{not json").await.unwrap();
    let tier = LocalTier::new(store.clone());

    let found = tier.get(ContentType::Quiz, &normalize("Oslo")).await.unwrap();
    assert!(found.is_none());
    assert!(store.get("quizzes:oslo").await.unwrap().is_none());
}

#[tokio::test]
async fn local_entry_with_bad_answer_index_is_removed() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let mut item = serde_json::to_value(quiz_item("Oslo")).unwrap();
    item["payload"]["questions"][0]["correctAnswerIndex"] = json!(7);
    store
        .set("quizzes:oslo", &item.to_string())
        .await
        .unwrap();
    let tier = LocalTier::new(store.clone());

    let found = tier.get(ContentType::Quiz, &normalize("Oslo")).await.unwrap();
    assert!(found.is_none());
    assert!(store.get("quizzes:oslo").await.unwrap().is_none());
}

#[tokio::test]
async fn local_get_all_and_clear_are_per_type() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let tier = LocalTier::new(store.clone());
    tier.put(&quiz_item("Oslo")).await.unwrap();
    tier.put(&quiz_item("Bergen")).await.unwrap();
    tier.put(&insight_item("Oslo")).await.unwrap();

    assert_eq!(tier.get_all(ContentType::Quiz).await.unwrap().len(), 2);

    tier.clear(ContentType::Quiz).await.unwrap();
    assert!(tier.get_all(ContentType::Quiz).await.unwrap().is_empty());
    assert_eq!(tier.get_all(ContentType::CulturalInsight).await.unwrap().len(), 1);
}

// ============================================================================
// Remote tier
// ============================================================================

fn remote(store: Arc<dyn DocumentStore>, clock: Arc<ManualClock>) -> RemoteTier {
    RemoteTier::new(store, "u1", Duration::from_secs(1), clock)
}

#[tokio::test]
async fn remote_upsert_stamps_freshness() {
    let store = Arc::new(MemoryDocumentStore::new());
    let now = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
    let tier = remote(store.clone(), Arc::new(ManualClock::new(now)));

    assert!(tier.freshness(ContentType::Quiz).await.unwrap().is_none());
    tier.upsert(&quiz_item("Oslo")).await.unwrap();

    assert_eq!(tier.freshness(ContentType::Quiz).await.unwrap(), Some(now));
    assert!(tier.freshness(ContentType::CulturalInsight).await.unwrap().is_none());

    let settings = store.get("users/u1/settings", "quizzes").await.unwrap().unwrap();
    assert_eq!(settings["lastUpdatedAt"], now.timestamp_millis());

    let found = tier.find(ContentType::Quiz, &normalize("Oslo")).await.unwrap();
    assert_eq!(found, Some(quiz_item("Oslo")));
}

#[tokio::test]
async fn remote_document_is_flat_and_mergeable() {
    let store = Arc::new(MemoryDocumentStore::new());
    let tier = remote(store.clone(), Arc::new(ManualClock::new(Utc::now())));
    store
        .set(
            "users/u1/culturalInsights",
            "oslo",
            json!({"favourite": true}),
            WriteMode::Replace,
        )
        .await
        .unwrap();

    tier.upsert(&insight_item("Oslo")).await.unwrap();

    let doc = store.get("users/u1/culturalInsights", "oslo").await.unwrap().unwrap();
    assert_eq!(doc["favourite"], true);
    assert_eq!(doc["region"], "Oslo");
    assert_eq!(doc["diningTips"], "Lunch is the main meal.");
}

#[tokio::test]
async fn remote_incomplete_document_is_a_miss() {
    let store = Arc::new(MemoryDocumentStore::new());
    let tier = remote(store.clone(), Arc::new(ManualClock::new(Utc::now())));
    store
        .set(
            "users/u1/quizzes",
            "oslo",
            json!({"key": "oslo", "displayName": "Oslo", "contentType": "quiz",
                   "createdAt": 0, "updatedAt": 0, "title": "Oslo"}),
            WriteMode::Replace,
        )
        .await
        .unwrap();

    assert!(tier.find(ContentType::Quiz, &normalize("Oslo")).await.unwrap().is_none());
    assert!(tier.find_all(ContentType::Quiz).await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_quiz_without_questions_is_a_miss() {
    let store = Arc::new(MemoryDocumentStore::new());
    let tier = remote(store.clone(), Arc::new(ManualClock::new(Utc::now())));
    store
        .set(
            "users/u1/quizzes",
            "oslo",
            json!({"key": "oslo", "displayName": "Oslo", "contentType": "quiz",
                   "createdAt": 0, "updatedAt": 0, "title": "Oslo",
                   "description": "Trivia", "questions": []}),
            WriteMode::Replace,
        )
        .await
        .unwrap();

    assert!(tier.find(ContentType::Quiz, &normalize("Oslo")).await.unwrap().is_none());
}

#[tokio::test]
async fn remote_explorable_regions_round_trip() {
    let store = Arc::new(MemoryDocumentStore::new());
    let tier = remote(store, Arc::new(ManualClock::new(Utc::now())));
    let regions = vec!["Oslo".to_string(), "Bergen".to_string()];

    tier.record_explorable_regions(ContentType::Quiz, &regions)
        .await
        .unwrap();
    assert_eq!(tier.explorable_regions(ContentType::Quiz).await.unwrap(), regions);
    assert!(
        tier.explorable_regions(ContentType::CulturalInsight)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn remote_clear_removes_items_and_stamp() {
    let store = Arc::new(MemoryDocumentStore::new());
    let tier = remote(store.clone(), Arc::new(ManualClock::new(Utc::now())));
    tier.upsert(&quiz_item("Oslo")).await.unwrap();
    tier.upsert(&quiz_item("Bergen")).await.unwrap();

    tier.clear(ContentType::Quiz).await.unwrap();
    assert_eq!(store.count("users/u1/quizzes"), 0);
    assert!(tier.freshness(ContentType::Quiz).await.unwrap().is_none());
}

/// Document store that never answers.
struct HangingStore;

#[async_trait]
impl DocumentStore for HangingStore {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Value>> {
        std::future::pending().await
    }

    async fn set(&self, _c: &str, _id: &str, _doc: Value, _mode: WriteMode) -> Result<()> {
        std::future::pending().await
    }

    async fn list(&self, _collection: &str) -> Result<Vec<(String, Value)>> {
        std::future::pending().await
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<()> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn remote_calls_are_bounded_by_timeout() {
    let tier = remote(Arc::new(HangingStore), Arc::new(ManualClock::new(Utc::now())));
    let err = tier
        .find(ContentType::Quiz, &normalize("Oslo"))
        .await
        .unwrap_err();
    assert!(matches!(err, WanderloreError::Timeout(_)));
}
