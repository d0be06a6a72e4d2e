//! Wanderlore - tiered cache for AI-generated travel content
//!
//! This crate serves cultural insights and quizzes for a region through
//! three cache tiers (memory, local persistent, remote per-user documents)
//! and only calls a generative backend on a full miss, guarded by a
//! per-user daily request budget.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wanderlore::{ContentType, Wanderlore};
//! use wanderlore::generation::GeminiBackend;
//! use wanderlore::store::{FileKeyValueStore, HttpDocumentStore};
//!
//! #[tokio::main]
//! async fn main() -> wanderlore::Result<()> {
//!     let cache = Wanderlore::builder()
//!         .user_id("traveller-42")
//!         .local_store(Arc::new(FileKeyValueStore::open_default()))
//!         .remote_store(Arc::new(HttpDocumentStore::new(
//!             "https://docs.example.com/v1",
//!             Some("token".into()),
//!         )?))
//!         .backend(Arc::new(GeminiBackend::new("api-key", "gemini-1.5-flash")?))
//!         .build()?;
//!
//!     let item = cache
//!         .get_content("Trastevere, Rome, Italy", ContentType::CulturalInsight)
//!         .await?;
//!     println!("{}", item.display_name);
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Only two failures reach callers of
//! [`get_content`](ContentCache::get_content):
//! [`RateLimitExceeded`](WanderloreError::RateLimitExceeded) (the budget is
//! spent; carries remaining quota and reset time) and
//! [`Generation`](WanderloreError::Generation). Tier failures are logged
//! and treated as misses.

pub mod budget;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod generation;
pub mod normalize;
pub mod orchestrator;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use budget::{BudgetConfig, BudgetGuard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Secrets};
pub use error::{Result, WanderloreError};
pub use normalize::normalize;
pub use orchestrator::{ContentCache, Wanderlore, WanderloreBuilder};
pub use types::{
    BudgetStatus, ContentItem, ContentKey, ContentPayload, ContentType, CulturalInsight, Quiz,
    QuizQuestion, Recommendation,
};
