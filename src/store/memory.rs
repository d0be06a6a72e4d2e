//! In-process store implementations.
//!
//! Useful for tests, previews and offline sessions where nothing needs to
//! survive the process. Both stores are cheap to clone handles over shared
//! state.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{DocumentStore, KeyValueStore, WriteMode, merge_documents};
use crate::Result;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// [`KeyValueStore`] backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(lock(&self.entries)
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// [`DocumentStore`] backed by nested maps (`collection → id → document`).
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, BTreeMap<String, Value>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        lock(&self.collections)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        mode: WriteMode,
    ) -> Result<()> {
        let mut collections = lock(&self.collections);
        let docs = collections.entry(collection.to_string()).or_default();
        match (mode, docs.get_mut(id)) {
            (WriteMode::Merge, Some(existing)) => merge_documents(existing, document),
            _ => {
                docs.insert(id.to_string(), document);
            }
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        Ok(lock(&self.collections)
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(docs) = lock(&self.collections).get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn kv_prefix_listing() {
        let store = MemoryKeyValueStore::new();
        store.set("quizzes:rome", "{}").await.unwrap();
        store.set("quizzes:oslo", "{}").await.unwrap();
        store.set("cultural_insights:rome", "{}").await.unwrap();

        let mut keys = store.keys("quizzes:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["quizzes:oslo", "quizzes:rome"]);
    }

    #[tokio::test]
    async fn document_merge_and_replace() {
        let store = MemoryDocumentStore::new();
        store
            .set("c", "d", json!({"a": 1, "b": 1}), WriteMode::Replace)
            .await
            .unwrap();
        store
            .set("c", "d", json!({"b": 2}), WriteMode::Merge)
            .await
            .unwrap();
        assert_eq!(
            store.get("c", "d").await.unwrap(),
            Some(json!({"a": 1, "b": 2}))
        );

        store
            .set("c", "d", json!({"b": 3}), WriteMode::Replace)
            .await
            .unwrap();
        assert_eq!(store.get("c", "d").await.unwrap(), Some(json!({"b": 3})));
    }

    #[tokio::test]
    async fn delete_absent_document_is_ok() {
        let store = MemoryDocumentStore::new();
        assert!(store.delete("nope", "nothing").await.is_ok());
        assert_eq!(store.count("nope"), 0);
    }
}
