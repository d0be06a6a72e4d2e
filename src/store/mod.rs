//! Storage backends under the cache tiers.

pub mod file;
pub mod http;
pub mod memory;
pub mod traits;

pub use file::{FileKeyValueStore, default_store_dir};
pub use http::HttpDocumentStore;
pub use memory::{MemoryDocumentStore, MemoryKeyValueStore};
pub use traits::{DocumentStore, KeyValueStore, WriteMode, merge_documents};
