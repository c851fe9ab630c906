//! Typed failures returned by the configuration store.

use profile_store_domain::{ConfigId, PrimitiveError};
use profile_store_shared::{ErrorCode, ErrorEnvelope};

/// Failure kinds surfaced by every store operation.
///
/// Callers branch on the variant; the boundary converts it into an
/// `ErrorEnvelope` with a stable `namespace:code`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The draft failed validation; nothing was written.
    #[error("invalid configuration: {0}")]
    Validation(#[source] PrimitiveError),
    /// The serialized record is larger than the local ceiling; nothing was written.
    #[error("configuration needs {size_bytes} bytes but the local limit is {ceiling_bytes} bytes")]
    SizeLimitExceeded {
        /// Serialized size of the rejected record.
        size_bytes: u64,
        /// Configured ceiling.
        ceiling_bytes: u64,
    },
    /// No configuration with this id exists on the selected backend.
    #[error("configuration {id} not found")]
    NotFound {
        /// Requested id.
        id: ConfigId,
    },
    /// The selected backend failed.
    #[error("{source}")]
    Backend {
        /// Underlying failure.
        source: ErrorEnvelope,
        /// Some writes committed before the failure. The source metadata says
        /// what was left behind (`indexStale` or `orphanedRecord`).
        partial: bool,
    },
}

impl StoreError {
    /// A backend failure with no committed writes.
    #[must_use]
    pub const fn backend(source: ErrorEnvelope) -> Self {
        Self::Backend {
            source,
            partial: false,
        }
    }

    /// A backend failure after some writes committed and could not be undone.
    #[must_use]
    pub const fn partial(source: ErrorEnvelope) -> Self {
        Self::Backend {
            source,
            partial: true,
        }
    }

    /// Whether the failure is a cancellation observed at operation entry.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Backend { source, .. } if source.is_cancelled())
    }

    /// Short kind label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::SizeLimitExceeded { .. } => "sizeLimitExceeded",
            Self::NotFound { .. } => "notFound",
            Self::Backend { .. } => "backend",
        }
    }
}

impl From<PrimitiveError> for StoreError {
    fn from(error: PrimitiveError) -> Self {
        Self::Validation(error)
    }
}

impl From<StoreError> for ErrorEnvelope {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::Validation(primitive) => {
                let cause = Self::from(primitive).code;
                Self::expected(ErrorCode::new("store", "validation"), message)
                    .with_metadata("cause", cause.to_string())
            },
            StoreError::SizeLimitExceeded {
                size_bytes,
                ceiling_bytes,
            } => Self::expected(ErrorCode::new("store", "size_limit_exceeded"), message)
                .with_metadata("sizeBytes", size_bytes.to_string())
                .with_metadata("ceilingBytes", ceiling_bytes.to_string()),
            StoreError::NotFound { id } => {
                Self::expected(ErrorCode::not_found(), message).with_metadata("configId", id.as_str())
            },
            StoreError::Backend { source, .. } if source.is_cancelled() => source,
            StoreError::Backend { source, partial } => {
                let mut envelope =
                    Self::unexpected(ErrorCode::new("store", "backend"), source.message, source.class)
                        .with_metadata("cause", source.code.to_string());
                for (key, value) in source.metadata {
                    envelope.metadata.entry(key).or_insert(value);
                }
                if partial {
                    envelope = envelope.with_metadata("partial", "true");
                }
                envelope
            },
        }
    }
}
