use std::time::Duration;

use chrono::{TimeZone, Utc};

use wanderlore::{Result, WanderloreError};

#[test]
fn test_error_display() {
    let err = WanderloreError::Generation("backend exploded".to_string());
    assert!(err.to_string().contains("backend exploded"));
}

#[test]
fn test_invalid_response_names_field() {
    let err = WanderloreError::InvalidResponse {
        field: "customs".into(),
        reason: "expected a non-empty array".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("customs"));
    assert!(msg.contains("non-empty array"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(WanderloreError::EmptyResponse)
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(WanderloreError::UpstreamRateLimited { retry_after: None }.is_transient());
    assert!(
        WanderloreError::UpstreamRateLimited {
            retry_after: Some(Duration::from_secs(1))
        }
        .is_transient()
    );
    assert!(WanderloreError::Network("connection reset".into()).is_transient());
    assert!(WanderloreError::Timeout(Duration::from_secs(60)).is_transient());
    assert!(
        WanderloreError::Api {
            status: 500,
            message: "internal".into()
        }
        .is_transient()
    );
    assert!(
        WanderloreError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient()
    );
}

#[test]
fn permanent_errors() {
    assert!(!WanderloreError::AuthenticationFailed.is_transient());
    assert!(!WanderloreError::EmptyResponse.is_transient());
    assert!(!WanderloreError::MalformedOutput("prose".into()).is_transient());
    assert!(!WanderloreError::Generation("bad".into()).is_transient());
    assert!(!WanderloreError::Configuration("missing key".into()).is_transient());
    assert!(
        !WanderloreError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient()
    );
    assert!(
        !WanderloreError::RateLimitExceeded {
            requests_remaining: 0,
            next_available_time: None,
        }
        .is_transient()
    );
}

// ============================================================================
// Hints
// ============================================================================

#[test]
fn retry_after_only_from_upstream_rate_limit() {
    let hinted = WanderloreError::UpstreamRateLimited {
        retry_after: Some(Duration::from_secs(7)),
    };
    assert_eq!(hinted.retry_after(), Some(Duration::from_secs(7)));
    assert_eq!(WanderloreError::Network("x".into()).retry_after(), None);
}

#[test]
fn budget_rejection_is_rate_limited() {
    let next = Utc.with_ymd_and_hms(2024, 8, 2, 0, 0, 0).unwrap();
    let err = WanderloreError::RateLimitExceeded {
        requests_remaining: 0,
        next_available_time: Some(next),
    };
    assert!(err.is_rate_limited());
    assert!(err.to_string().contains("daily request limit"));

    // The upstream 429 is a different thing.
    assert!(!WanderloreError::UpstreamRateLimited { retry_after: None }.is_rate_limited());
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn io_errors_become_storage_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err: WanderloreError = io.into();
    assert!(matches!(err, WanderloreError::Storage(ref m) if m.contains("read-only")));
}

#[test]
fn json_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: WanderloreError = parse.into();
    assert!(matches!(err, WanderloreError::Json(_)));
    assert!(!err.is_transient());
}

#[test]
fn malformed_output_classification() {
    assert!(WanderloreError::MalformedOutput("not JSON".into()).is_malformed_output());
    assert!(WanderloreError::EmptyResponse.is_malformed_output());
    assert!(!WanderloreError::AuthenticationFailed.is_malformed_output());
    assert!(!WanderloreError::Network("reset".into()).is_malformed_output());
}
