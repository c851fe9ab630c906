//! Test fixtures for shared error codes and envelopes.

use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Code carried by every fault injected through the testkit doubles.
pub fn injected_fault_code() -> ErrorCode {
    ErrorCode::new("testkit", "injected_fault")
}

/// Return a list of common error codes used in tests.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::cancelled(),
        ErrorCode::invalid_input(),
        ErrorCode::not_found(),
        ErrorCode::timeout(),
        ErrorCode::io(),
        ErrorCode::internal(),
    ]
}

/// A non-retriable injected storage fault for `operation`.
pub fn injected_fault(operation: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        injected_fault_code(),
        format!("injected fault during {operation}"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("operation", operation.to_string())
}

/// A retriable remote outage fixture.
pub fn remote_unavailable(operation: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("remote", "unavailable"),
        "remote service unavailable",
        ErrorClass::Retriable,
    )
    .with_metadata("operation", operation.to_string())
}
