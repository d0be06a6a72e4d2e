use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use wanderlore::generation::{
    GenerationBackend, GenerationRequest, RetryConfig, RetryingBackend,
};
use wanderlore::{Result, WanderloreError};

/// Mock backend that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    fail_with: fn() -> WanderloreError,
    total_calls: AtomicU32,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> WanderloreError) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerationBackend for FailThenSucceed {
    fn name(&self) -> &str {
        "mock-retry"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<Value> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        Ok(json!({"ok": true}))
    }
}

fn fast_retry(attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .max_attempts(attempts)
        .initial_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn retries_on_transient_error_then_succeeds() {
    let inner = Arc::new(FailThenSucceed::new(2, || {
        WanderloreError::UpstreamRateLimited { retry_after: None }
    }));
    let backend = RetryingBackend::new(inner.clone(), fast_retry(3));

    let result = backend.generate(&GenerationRequest::json("p")).await;

    assert!(result.is_ok());
    assert_eq!(inner.call_count(), 3); // 2 failures + 1 success
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let inner = Arc::new(FailThenSucceed::new(10, || {
        WanderloreError::Network("connection reset".into())
    }));
    let backend = RetryingBackend::new(inner.clone(), fast_retry(3));

    let err = backend
        .generate(&GenerationRequest::json("p"))
        .await
        .unwrap_err();

    assert!(matches!(err, WanderloreError::Network(_)));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test]
async fn does_not_retry_permanent_errors() {
    let inner = Arc::new(FailThenSucceed::new(1, || {
        WanderloreError::AuthenticationFailed
    }));
    let backend = RetryingBackend::new(inner.clone(), fast_retry(3));

    let result = backend.generate(&GenerationRequest::json("p")).await;

    assert!(matches!(result, Err(WanderloreError::AuthenticationFailed)));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn client_errors_are_permanent() {
    let inner = Arc::new(FailThenSucceed::new(1, || WanderloreError::Api {
        status: 400,
        message: "bad request".into(),
    }));
    let backend = RetryingBackend::new(inner.clone(), fast_retry(3));

    assert!(backend.generate(&GenerationRequest::json("p")).await.is_err());
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn respects_retry_after_hint() {
    let inner = Arc::new(FailThenSucceed::new(1, || {
        WanderloreError::UpstreamRateLimited {
            retry_after: Some(Duration::from_secs(30)),
        }
    }));
    let backend = RetryingBackend::new(inner.clone(), fast_retry(2));

    let start = tokio::time::Instant::now();
    backend
        .generate(&GenerationRequest::json("p"))
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test]
async fn disabled_config_makes_one_attempt() {
    let inner = Arc::new(FailThenSucceed::new(1, || WanderloreError::Timeout(
        Duration::from_secs(1)
    )));
    let backend = RetryingBackend::new(inner.clone(), RetryConfig::disabled());

    assert!(backend.generate(&GenerationRequest::json("p")).await.is_err());
    assert_eq!(inner.call_count(), 1);
}
