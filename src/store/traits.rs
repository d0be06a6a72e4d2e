//! Storage backend traits.
//!
//! Two seams sit under the cache tiers:
//!
//! - [`KeyValueStore`]: device-local durable strings, used by the
//!   [`LocalTier`](crate::cache::LocalTier).
//! - [`DocumentStore`]: a per-user cloud document database, used by the
//!   [`RemoteTier`](crate::cache::RemoteTier) and the
//!   [`BudgetGuard`](crate::budget::BudgetGuard).
//!
//! Backends report every failure as an error. Deciding that a failure is a
//! cache miss is the tier's job, not the backend's.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

// ============================================================================
// Key/value store
// ============================================================================

/// Durable string key/value storage scoped to the device.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, in no particular order.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

// ============================================================================
// Document store
// ============================================================================

/// How [`DocumentStore::set`] treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Top-level fields of the incoming document overwrite existing ones;
    /// fields not mentioned are kept.
    Merge,
    /// The incoming document replaces the existing one.
    Replace,
}

/// A JSON document database addressed by `collection` path and document id.
///
/// Collection paths are slash-separated (`users/{uid}/quizzes`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Create or update a document.
    async fn set(&self, collection: &str, id: &str, document: Value, mode: WriteMode)
    -> Result<()>;

    /// All documents in a collection as `(id, document)` pairs.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>>;

    /// Delete a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Shallow-merge `incoming` into `existing`.
///
/// Objects merge field by field; anything else is replaced wholesale.
pub fn merge_documents(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (field, value) in incoming {
                existing.insert(field, value);
            }
        }
        (existing, incoming) => *existing = incoming,
    }
}
