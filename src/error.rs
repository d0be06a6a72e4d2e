//! Wanderlore error types

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wanderlore error types
#[derive(Debug, thiserror::Error)]
pub enum WanderloreError {
    // Caller-facing errors
    /// The daily generation budget is exhausted.
    ///
    /// Carries enough information for a UI to render "try again at X".
    #[error("daily request limit reached ({requests_remaining} remaining, next available {next_available_time:?})")]
    RateLimitExceeded {
        requests_remaining: u32,
        next_available_time: Option<DateTime<Utc>>,
    },

    /// The generative backend failed or returned an unusable structure.
    #[error("generation failed: {0}")]
    Generation(String),

    // Generation response errors
    #[error("invalid response field '{field}': {reason}")]
    InvalidResponse { field: String, reason: String },

    #[error("empty response from backend")]
    EmptyResponse,

    /// The backend answered, but its output is not the JSON asked for.
    #[error("malformed backend output: {0}")]
    MalformedOutput(String),

    // Storage errors (local + remote tiers)
    #[error("storage error: {0}")]
    Storage(String),

    // Network errors
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("upstream rate limited, retry after {retry_after:?}")]
    UpstreamRateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WanderloreError {
    /// Whether the error is worth retrying against the same backend.
    ///
    /// Network failures, timeouts, upstream 429s and 5xx responses are
    /// transient. Everything else (auth, validation, budget) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            WanderloreError::Network(_)
            | WanderloreError::Timeout(_)
            | WanderloreError::UpstreamRateLimited { .. } => true,
            WanderloreError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Upstream `retry_after` hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            WanderloreError::UpstreamRateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether the backend answered with output that cannot be used.
    ///
    /// Such a call still counts against the daily budget.
    pub fn is_malformed_output(&self) -> bool {
        matches!(
            self,
            WanderloreError::MalformedOutput(_) | WanderloreError::EmptyResponse
        )
    }

    /// Whether this is the caller-facing budget rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, WanderloreError::RateLimitExceeded { .. })
    }
}

impl From<reqwest::Error> for WanderloreError {
    fn from(err: reqwest::Error) -> Self {
        WanderloreError::Network(err.to_string())
    }
}

impl From<std::io::Error> for WanderloreError {
    fn from(err: std::io::Error) -> Self {
        WanderloreError::Storage(err.to_string())
    }
}

/// Result type alias for Wanderlore operations
pub type Result<T> = std::result::Result<T, WanderloreError>;
