//! Key-value engines backing the local configuration store.
//!
//! Every engine stores opaque UTF-8 values, makes each `put` durable before
//! resolving, and enumerates keys by prefix in ascending byte order.

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::fmt;

pub(crate) fn storage_error(operation: &'static str, error: impl fmt::Display) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("kv", "storage_failed"),
        format!("{operation} failed: {error}"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("operation", operation)
}

pub(crate) fn task_error(operation: &'static str, error: impl fmt::Display) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::internal(),
        format!("{operation} task failed: {error}"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("operation", operation)
}
