//! # profile-store-shared
//!
//! Shared result types and error handling for the profile-store workspace.
//!
//! Everything here is backend-agnostic:
//!
//! - `ErrorEnvelope` and the stable `namespace:code` identifiers
//! - Request-scoped context (correlation id + cancellation)
//! - Validation traits consumed by the `Validate` derive
//! - Secret redaction helpers used by loggers and config

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;
pub mod invariants;
pub mod redaction;
pub mod result;
pub mod validation;

pub use concurrency::{CorrelationId, RequestContext};
pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use invariants::{BoundedU64, BoundsError, Validated};
pub use redaction::{REDACTED, SecretString, is_secret_key, redact_if_secret};
pub use result::Result;
pub use validation::{Validate, ValidationError};
