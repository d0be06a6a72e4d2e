//! Per-user remote document tier.
//!
//! Layout in the [`DocumentStore`]:
//!
//! ```text
//! users/{uid}/{collection}/{key}        one document per item
//! users/{uid}/settings/{collection}     SettingsDocument (lastUpdatedAt, explorableRegions)
//! ```
//!
//! Item documents are flat: the payload fields (`region`, `customs`, ... or
//! `title`, `questions`, ...) sit beside `key`, `displayName`,
//! `contentType`, `createdAt` and `updatedAt` (epoch millis). A document
//! missing a mandatory payload field, or breaking a content rule such as an
//! out-of-range answer index, is a miss, never a half-filled item.
//!
//! Every successful [`upsert`](RemoteTier::upsert) stamps the settings
//! document's `lastUpdatedAt`. That single timestamp is the freshness
//! window for the whole content type; the orchestrator compares it with
//! its refresh interval.
//!
//! All calls are bounded by the tier timeout. Network failures and
//! timeouts come back as errors for the caller to treat as a miss.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::clock::Clock;
use crate::generation::schema;
use crate::store::{DocumentStore, WriteMode, merge_documents};
use crate::types::{
    ContentItem, ContentKey, ContentPayload, ContentType, CulturalInsight, Quiz, SettingsDocument,
};
use crate::{Result, WanderloreError};

/// Default timeout for a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Document id of the budget settings document.
pub(crate) const GENERATION_SETTINGS_ID: &str = "generation";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentMeta {
    key: String,
    display_name: String,
    content_type: ContentType,
    created_at: i64,
    updated_at: i64,
}

/// Remote tier over a [`DocumentStore`], scoped to one user.
pub struct RemoteTier {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl RemoteTier {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        user_id: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            timeout,
            clock,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Look up an item by key.
    pub async fn find(
        &self,
        content_type: ContentType,
        key: &ContentKey,
    ) -> Result<Option<ContentItem>> {
        let collection = collection_path(&self.user_id, content_type);
        let id = document_id(key.as_str());
        let Some(doc) = self.bounded(self.store.get(&collection, &id)).await? else {
            return Ok(None);
        };
        Ok(self.decode_logged(content_type, &id, doc))
    }

    /// Merge an item into its document and stamp the freshness window.
    pub async fn upsert(&self, item: &ContentItem) -> Result<()> {
        let content_type = item.content_type();
        let collection = collection_path(&self.user_id, content_type);
        let doc = encode_document(item)?;
        self.bounded(self.store.set(
            &collection,
            &document_id(&item.key),
            doc,
            WriteMode::Merge,
        ))
        .await?;

        let stamp = SettingsDocument {
            last_updated_at: Some(self.clock.now().timestamp_millis()),
            ..Default::default()
        };
        self.write_settings(content_type, &stamp).await
    }

    /// Every decodable item of a type.
    pub async fn find_all(&self, content_type: ContentType) -> Result<Vec<ContentItem>> {
        let collection = collection_path(&self.user_id, content_type);
        let docs = self.bounded(self.store.list(&collection)).await?;
        Ok(docs
            .into_iter()
            .filter_map(|(id, doc)| self.decode_logged(content_type, &id, doc))
            .collect())
    }

    /// When the type's remote cache was last written, if ever.
    pub async fn freshness(&self, content_type: ContentType) -> Result<Option<DateTime<Utc>>> {
        let settings = self.read_settings(content_type).await?;
        Ok(settings
            .last_updated_at
            .and_then(DateTime::from_timestamp_millis))
    }

    /// Regions last recorded through [`record_explorable_regions`](Self::record_explorable_regions).
    pub async fn explorable_regions(&self, content_type: ContentType) -> Result<Vec<String>> {
        let settings = self.read_settings(content_type).await?;
        Ok(settings.explorable_regions.unwrap_or_default())
    }

    /// Replace the list of explorable regions for a type.
    pub async fn record_explorable_regions(
        &self,
        content_type: ContentType,
        regions: &[String],
    ) -> Result<()> {
        let update = SettingsDocument {
            explorable_regions: Some(regions.to_vec()),
            ..Default::default()
        };
        self.write_settings(content_type, &update).await
    }

    /// Delete every item of a type and its settings document.
    pub async fn clear(&self, content_type: ContentType) -> Result<()> {
        let collection = collection_path(&self.user_id, content_type);
        for (id, _) in self.bounded(self.store.list(&collection)).await? {
            self.bounded(self.store.delete(&collection, &id)).await?;
        }
        self.bounded(
            self.store
                .delete(&settings_path(&self.user_id), content_type.collection()),
        )
        .await
    }

    async fn read_settings(&self, content_type: ContentType) -> Result<SettingsDocument> {
        let doc = self
            .bounded(
                self.store
                    .get(&settings_path(&self.user_id), content_type.collection()),
            )
            .await?;
        match doc {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Ok(SettingsDocument::default()),
        }
    }

    async fn write_settings(
        &self,
        content_type: ContentType,
        update: &SettingsDocument,
    ) -> Result<()> {
        let doc = serde_json::to_value(update)?;
        self.bounded(self.store.set(
            &settings_path(&self.user_id),
            content_type.collection(),
            doc,
            WriteMode::Merge,
        ))
        .await
    }

    fn decode_logged(&self, content_type: ContentType, id: &str, doc: Value) -> Option<ContentItem> {
        match decode_document(content_type, doc) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    content_type = %content_type,
                    id,
                    error = %e,
                    "ignoring incomplete remote document"
                );
                None
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| WanderloreError::Timeout(self.timeout))?
    }
}

pub(crate) fn settings_path(user_id: &str) -> String {
    format!("users/{user_id}/settings")
}

fn collection_path(user_id: &str, content_type: ContentType) -> String {
    format!("users/{user_id}/{}", content_type.collection())
}

/// Document ids may not contain `/`.
fn document_id(key: &str) -> String {
    key.replace('/', "_")
}

fn encode_document(item: &ContentItem) -> Result<Value> {
    let meta = DocumentMeta {
        key: item.key.clone(),
        display_name: item.display_name.clone(),
        content_type: item.content_type(),
        created_at: item.created_at.timestamp_millis(),
        updated_at: item.updated_at.timestamp_millis(),
    };
    let mut doc = serde_json::to_value(meta)?;
    let payload = match &item.payload {
        ContentPayload::CulturalInsight(insight) => serde_json::to_value(insight)?,
        ContentPayload::Quiz(quiz) => serde_json::to_value(quiz)?,
    };
    merge_documents(&mut doc, payload);
    Ok(doc)
}

fn decode_document(content_type: ContentType, doc: Value) -> Result<ContentItem> {
    let meta: DocumentMeta = serde_json::from_value(doc.clone())?;
    if meta.content_type != content_type {
        return Err(WanderloreError::InvalidResponse {
            field: "contentType".into(),
            reason: format!("expected {content_type}, found {}", meta.content_type),
        });
    }
    let payload = match content_type {
        ContentType::CulturalInsight => {
            ContentPayload::CulturalInsight(serde_json::from_value::<CulturalInsight>(doc)?)
        }
        ContentType::Quiz => ContentPayload::Quiz(serde_json::from_value::<Quiz>(doc)?),
    };
    schema::check(&payload)?;
    let timestamp = |field: &str, ms: i64| {
        DateTime::from_timestamp_millis(ms).ok_or_else(|| WanderloreError::InvalidResponse {
            field: field.to_string(),
            reason: format!("timestamp {ms} out of range"),
        })
    };
    Ok(ContentItem {
        key: meta.key,
        display_name: meta.display_name,
        payload,
        created_at: timestamp("createdAt", meta.created_at)?,
        updated_at: timestamp("updatedAt", meta.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::types::QuizQuestion;
    use chrono::TimeZone;

    fn sample_quiz_item() -> ContentItem {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let payload = ContentPayload::Quiz(Quiz {
            title: "Lisbon Quiz".into(),
            description: "How well do you know Lisbon?".into(),
            questions: vec![QuizQuestion {
                question: "Which river flows through Lisbon?".into(),
                options: ["Tagus".into(), "Douro".into(), "Seine".into(), "Po".into()],
                correct_answer_index: 0,
                explanation: "The Tagus meets the Atlantic at Lisbon.".into(),
            }],
        });
        ContentItem::new(&normalize("Lisbon"), payload, now)
    }

    #[test]
    fn document_is_flat_with_millis() {
        let doc = encode_document(&sample_quiz_item()).unwrap();
        assert_eq!(doc["key"], "lisbon");
        assert_eq!(doc["contentType"], "quiz");
        assert_eq!(doc["title"], "Lisbon Quiz");
        assert!(doc["createdAt"].is_i64());
        assert!(doc.get("payload").is_none());
    }

    #[test]
    fn decode_restores_item() {
        let item = sample_quiz_item();
        let decoded = decode_document(ContentType::Quiz, encode_document(&item).unwrap()).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn missing_payload_field_is_rejected() {
        let mut doc = encode_document(&sample_quiz_item()).unwrap();
        doc.as_object_mut().unwrap().remove("questions");
        assert!(decode_document(ContentType::Quiz, doc).is_err());
    }

    #[test]
    fn document_ids_strip_slashes() {
        assert_eq!(document_id("a/b"), "a_b");
    }
}
