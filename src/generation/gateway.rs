//! Budget-guarded generation of typed content.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use super::http::DEFAULT_GENERATION_TIMEOUT;
use super::traits::{GenerationBackend, GenerationRequest};
use super::{prompt, schema};
use crate::budget::BudgetGuard;
use crate::clock::Clock;
use crate::telemetry;
use crate::types::{ContentItem, ContentKey, ContentType};
use crate::{Result, WanderloreError};

/// Turns a key and content type into a validated [`ContentItem`].
///
/// Flow per call:
///
/// 1. Refuse the sentinel key; no budget is spent on it.
/// 2. [`BudgetGuard::check`]; a denial becomes
///    [`RateLimitExceeded`](WanderloreError::RateLimitExceeded).
/// 3. One backend call, bounded by the gateway timeout. A transport,
///    status or timeout failure becomes
///    [`Generation`](WanderloreError::Generation) and does not count
///    against the budget.
/// 4. [`BudgetGuard::increment`] exactly once for the answered call, even
///    when the answer is not JSON at all.
/// 5. Strict validation with fallback repair. Unparseable or unrepairable
///    output is a `Generation` error; the increment from step 4 stands.
pub struct GenerationGateway {
    backend: Arc<dyn GenerationBackend>,
    budget: Arc<BudgetGuard>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl GenerationGateway {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        budget: Arc<BudgetGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            budget,
            clock,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Set the overall timeout for one backend call (retries included).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn budget(&self) -> &BudgetGuard {
        &self.budget
    }

    /// Generate content of `content_type` about `key`.
    #[instrument(skip(self, key), fields(topic = %key, backend = self.backend.name()))]
    pub async fn generate(&self, key: &ContentKey, content_type: ContentType) -> Result<ContentItem> {
        if key.is_unknown() {
            return Err(WanderloreError::Generation(
                "cannot generate content for an unknown region".into(),
            ));
        }

        let status = self.budget.check().await;
        if !status.can_request {
            metrics::counter!(telemetry::BUDGET_REJECTIONS_TOTAL).increment(1);
            info!(next_available_time = ?status.next_available_time, "daily generation budget exhausted");
            return Err(WanderloreError::RateLimitExceeded {
                requests_remaining: status.requests_remaining,
                next_available_time: status.next_available_time,
            });
        }

        let request = GenerationRequest::json(prompt::build(content_type, key.display()));
        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.backend.generate(&request))
            .await
            .unwrap_or(Err(WanderloreError::Timeout(self.timeout)));
        metrics::histogram!(
            telemetry::GENERATION_DURATION_SECONDS,
            "content_type" => content_type.as_str(),
        )
        .record(start.elapsed().as_secs_f64());

        let answer = match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_malformed_output() => Err(e),
            Err(e) => {
                record_outcome(content_type, "error");
                warn!(error = %e, "generation backend failed");
                return Err(WanderloreError::Generation(e.to_string()));
            }
        };

        // The backend answered, so the call counts whatever it said.
        let remaining = self.budget.increment().await.requests_remaining;

        let validated = match answer
            .and_then(|value| schema::validate(content_type, key.display(), &value))
        {
            Ok(validated) => validated,
            Err(e) => {
                record_outcome(content_type, "error");
                warn!(error = %e, "generation response is unusable");
                return Err(WanderloreError::Generation(format!("unusable response: {e}")));
            }
        };
        for field in &validated.repaired {
            metrics::counter!(
                telemetry::FALLBACK_REPAIRS_TOTAL,
                "content_type" => content_type.as_str(),
                "field" => *field,
            )
            .increment(1);
        }
        record_outcome(content_type, "ok");
        info!(
            repaired = ?validated.repaired,
            requests_remaining = remaining,
            "generated content"
        );

        Ok(ContentItem::new(key, validated.payload, self.clock.now()))
    }
}

fn record_outcome(content_type: ContentType, status: &'static str) {
    metrics::counter!(
        telemetry::GENERATIONS_TOTAL,
        "content_type" => content_type.as_str(),
        "status" => status,
    )
    .increment(1);
}
