//! Generation gateway and backends.
//!
//! [`GenerationGateway`] sits between the cache and a
//! [`GenerationBackend`]: it enforces the daily budget, bounds the call,
//! and turns the model's JSON into a typed payload through [`schema`].
//!
//! # Backends
//!
//! - [`GeminiBackend`]: HTTP client for a `generateContent` endpoint.
//! - [`RetryingBackend`]: decorator retrying transient failures.
//!
//! Tests and embedders can implement [`GenerationBackend`] directly.

pub mod fallback;
mod gateway;
pub mod http;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod traits;

pub use gateway::GenerationGateway;
pub use http::{DEFAULT_GENERATION_TIMEOUT, GeminiBackend};
pub use retry::{RetryConfig, RetryingBackend};
pub use schema::{Validated, validate};
pub use traits::{GenerationBackend, GenerationRequest, ResponseFormat};
