//! Backend trait for the generative text service.
//!
//! Backends receive a prompt and return the raw JSON object the model
//! produced. They do not know about content types or schemas; shaping the
//! object into a payload is [`schema`](super::schema)'s job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Output format requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
}

/// A single structured-output request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    /// A JSON-output request for `prompt`.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_format: ResponseFormat::Json,
        }
    }
}

/// Generative backend returning one JSON object per request.
///
/// Errors should use the transport variants of
/// [`WanderloreError`](crate::WanderloreError) (`Network`, `Api`,
/// `UpstreamRateLimited`, `Timeout`) so that
/// [`RetryingBackend`](super::RetryingBackend) can tell transient failures
/// apart.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Run the request and return the produced object.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;
}
