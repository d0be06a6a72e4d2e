//! Device-local persistent tier.
//!
//! Items are stored as `ContentItem` JSON in a [`KeyValueStore`] under
//! `"<prefix>:<key>"`, where the prefix is the content type's
//! [`storage_prefix`](ContentType::storage_prefix). There is no TTL here:
//! whether a local copy is still good is not this tier's call.
//!
//! A stored value that fails to decode, or decodes to content the
//! generator would have rejected, is removed and reported as a miss.
//! Only store I/O failures come back as errors.

use std::sync::Arc;

use tracing::warn;

use crate::Result;
use crate::generation::schema;
use crate::store::KeyValueStore;
use crate::types::{ContentItem, ContentKey, ContentType};

/// Persistent tier over a [`KeyValueStore`].
pub struct LocalTier {
    store: Arc<dyn KeyValueStore>,
}

impl LocalTier {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Look up an item.
    pub async fn get(
        &self,
        content_type: ContentType,
        key: &ContentKey,
    ) -> Result<Option<ContentItem>> {
        self.load(content_type, &storage_key(content_type, key.as_str()))
            .await
    }

    /// Persist an item under its own key and type.
    pub async fn put(&self, item: &ContentItem) -> Result<()> {
        let json = serde_json::to_string(item)?;
        self.store
            .set(&storage_key(item.content_type(), &item.key), &json)
            .await
    }

    /// Every decodable item of a type. Malformed entries are removed.
    pub async fn get_all(&self, content_type: ContentType) -> Result<Vec<ContentItem>> {
        let mut items = Vec::new();
        for storage_key in self.store.keys(&namespace(content_type)).await? {
            if let Some(item) = self.load(content_type, &storage_key).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Remove every item of a type.
    pub async fn clear(&self, content_type: ContentType) -> Result<()> {
        for storage_key in self.store.keys(&namespace(content_type)).await? {
            self.store.remove(&storage_key).await?;
        }
        Ok(())
    }

    async fn load(
        &self,
        content_type: ContentType,
        storage_key: &str,
    ) -> Result<Option<ContentItem>> {
        let Some(raw) = self.store.get(storage_key).await? else {
            return Ok(None);
        };

        match decode(content_type, &raw) {
            Ok(item) => Ok(Some(item)),
            Err(reason) => {
                warn!(
                    store = self.store.name(),
                    key = storage_key,
                    %reason,
                    "removing malformed local entry"
                );
                if let Err(e) = self.store.remove(storage_key).await {
                    warn!(key = storage_key, error = %e, "failed to remove malformed local entry");
                }
                Ok(None)
            }
        }
    }
}

fn namespace(content_type: ContentType) -> String {
    format!("{}:", content_type.storage_prefix())
}

fn storage_key(content_type: ContentType, key: &str) -> String {
    format!("{}{key}", namespace(content_type))
}

fn decode(content_type: ContentType, raw: &str) -> std::result::Result<ContentItem, String> {
    let item: ContentItem = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if item.content_type() != content_type {
        return Err(format!(
            "expected {content_type}, found {}",
            item.content_type()
        ));
    }
    schema::check(&item.payload).map_err(|e| e.to_string())?;
    Ok(item)
}
