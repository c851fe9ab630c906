//! Remote account-scoped backend contract.

use crate::BoxFuture;
use profile_store_domain::{AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity};
use profile_store_shared::{RequestContext, Result};

/// Boundary contract for the remote configuration service.
///
/// Every call is scoped to the identity resolved for the unit of work. The
/// service owns its own consistency; callers only rely on these shapes.
pub trait RemoteConfigPort: Send + Sync {
    /// List metadata for every configuration owned by `identity`.
    fn list(
        &self,
        ctx: &RequestContext,
        identity: Identity,
    ) -> BoxFuture<'_, Result<Vec<ConfigMetadata>>>;

    /// Create (no id) or replace (id present) a configuration.
    fn save(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        candidate: ConfigCandidate,
    ) -> BoxFuture<'_, Result<ConfigMetadata>>;

    /// Load a full record; `None` when the service has no such id.
    fn load(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>>;

    /// Delete a record; returns the service's `deleted` flag.
    fn delete(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<bool>>;
}
