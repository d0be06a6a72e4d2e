//! Request budget state and status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persisted per-user budget counter (the `requestLimits` field).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLimits {
    /// Generation calls made on `last_request_date`.
    #[serde(default)]
    pub request_count: u32,
    /// Calendar day of the last counted call.
    #[serde(default)]
    pub last_request_date: Option<NaiveDate>,
    /// Set once the ceiling is reached: the next local midnight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_available_time: Option<DateTime<Utc>>,
}

/// Result of a budget check, shaped for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub can_request: bool,
    pub requests_remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_available_time: Option<DateTime<Utc>>,
}
