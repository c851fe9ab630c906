//! Remote backend adapters.

#[cfg(feature = "remote-http")]
pub mod http;

use profile_store_domain::{AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity};
use profile_store_ports::{BoxFuture, RemoteConfigPort};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};

/// Remote used when no base URL is configured: every call fails.
///
/// Signed-in users without a configured service get a backend error per
/// operation instead of a silent fallback to local storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRemote;

impl UnconfiguredRemote {
    fn unavailable<T: Send + 'static>(operation: &'static str) -> BoxFuture<'static, Result<T>> {
        Box::pin(async move {
            Err(ErrorEnvelope::unexpected(
                ErrorCode::new("remote", "not_configured"),
                "remote configuration service is not configured",
                ErrorClass::NonRetriable,
            )
            .with_metadata("operation", operation))
        })
    }
}

impl RemoteConfigPort for UnconfiguredRemote {
    fn list(
        &self,
        _ctx: &RequestContext,
        _identity: Identity,
    ) -> BoxFuture<'_, Result<Vec<ConfigMetadata>>> {
        Self::unavailable("remote.list")
    }

    fn save(
        &self,
        _ctx: &RequestContext,
        _identity: Identity,
        _candidate: ConfigCandidate,
    ) -> BoxFuture<'_, Result<ConfigMetadata>> {
        Self::unavailable("remote.save")
    }

    fn load(
        &self,
        _ctx: &RequestContext,
        _identity: Identity,
        _id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>> {
        Self::unavailable("remote.load")
    }

    fn delete(
        &self,
        _ctx: &RequestContext,
        _identity: Identity,
        _id: ConfigId,
    ) -> BoxFuture<'_, Result<bool>> {
        Self::unavailable("remote.delete")
    }
}
