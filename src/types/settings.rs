//! Per-user settings documents in the remote store.

use serde::{Deserialize, Serialize};

use super::RequestLimits;

/// The `settings` document kept beside each remote content collection.
///
/// Every field is optional so partial documents written by other clients
/// still parse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    /// Epoch millis of the last authoritative write (the freshness window).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<i64>,
    /// Display names of regions the user asked about in bulk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorable_regions: Option<Vec<String>>,
    /// Daily generation budget counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_limits: Option<RequestLimits>,
}
