//! Cache tiers, cheapest first.
//!
//! - [`MemoryTier`]: moka LRU + TTL, process-local, checked first.
//! - [`LocalTier`]: durable device storage over a
//!   [`KeyValueStore`](crate::store::KeyValueStore), no TTL.
//! - [`RemoteTier`]: per-user cloud documents over a
//!   [`DocumentStore`](crate::store::DocumentStore), gated by a
//!   per-content-type freshness window.
//!
//! The tiers know nothing about each other. Ordering, write-through and
//! the decision to treat a failure as a miss all live in
//! [`ContentCache`](crate::orchestrator::ContentCache).
//!
//! ```text
//! get_content("Rome", Quiz)
//!     │
//!     ▼
//!  MemoryTier ──hit──► return
//!     │ miss
//!     ▼
//!  LocalTier ──hit──► write Memory, return
//!     │ miss / error
//!     ▼
//!  RemoteTier ──hit + fresh──► write Local + Memory, return
//!     │ miss / stale / error
//!     ▼
//!  GenerationGateway ──ok──► write Remote + Local + Memory, return
//! ```

pub mod local;
pub mod memory;
pub mod remote;

pub use local::LocalTier;
pub use memory::{MemoryConfig, MemoryTier};
pub use remote::{DEFAULT_REMOTE_TIMEOUT, RemoteTier};
