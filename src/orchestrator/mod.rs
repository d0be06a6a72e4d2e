//! Cache orchestration: the public entry point.
//!
//! - [`ContentCache`]: tier chain, write-through, batch lookups
//! - [`Wanderlore`] / [`WanderloreBuilder`]: construction and wiring

mod builder;
mod cache;

pub use builder::{DEFAULT_USER_ID, Wanderlore, WanderloreBuilder};
pub use cache::{ContentCache, DEFAULT_REFRESH_INTERVAL};
