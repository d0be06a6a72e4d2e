//! Telemetry metric name constants.
//!
//! Centralised metric names for wanderlore operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `wanderlore_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `tier`: cache tier, "memory", "local" or "remote"
//! - `content_type`: "cultural_insight" or "quiz"
//! - `status`: outcome, "ok" or "error"

/// Total cache tier hits.
///
/// Labels: `tier`, `content_type`.
pub const TIER_HITS_TOTAL: &str = "wanderlore_tier_hits_total";

/// Total cache tier misses (including failures treated as misses).
///
/// Labels: `tier`, `content_type`.
pub const TIER_MISSES_TOTAL: &str = "wanderlore_tier_misses_total";

/// Remote hits ignored because the freshness window expired.
///
/// Labels: `content_type`.
pub const STALE_REMOTE_TOTAL: &str = "wanderlore_stale_remote_total";

/// Total generation calls sent to the backend.
///
/// Labels: `content_type`, `status` ("ok" | "error").
pub const GENERATIONS_TOTAL: &str = "wanderlore_generations_total";

/// Generation duration in seconds.
///
/// Labels: `content_type`.
pub const GENERATION_DURATION_SECONDS: &str = "wanderlore_generation_duration_seconds";

/// Total backend retry attempts (not counting the initial request).
///
/// Labels: `backend`.
pub const RETRIES_TOTAL: &str = "wanderlore_retries_total";

/// Total responses that needed fallback repair.
///
/// Labels: `content_type`, `field`.
pub const FALLBACK_REPAIRS_TOTAL: &str = "wanderlore_fallback_repairs_total";

/// Total requests rejected by the daily budget.
pub const BUDGET_REJECTIONS_TOTAL: &str = "wanderlore_budget_rejections_total";
