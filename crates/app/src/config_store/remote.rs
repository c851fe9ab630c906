//! Remote backend path. The service owns its own consistency.

use super::{ConfigStore, StoreError};
use profile_store_domain::{
    AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity, sort_metadata,
};
use profile_store_shared::{ErrorCode, ErrorEnvelope, RequestContext};

impl ConfigStore {
    pub(super) async fn list_remote(
        &self,
        ctx: &RequestContext,
        identity: &Identity,
    ) -> Vec<ConfigMetadata> {
        match self.deps.remote.list(ctx, identity.clone()).await {
            Ok(mut entries) => {
                sort_metadata(&mut entries);
                entries
            },
            Err(error) => {
                self.report_degraded_list(&error, "Could not load configurations from your account");
                Vec::new()
            },
        }
    }

    pub(super) async fn save_remote(
        &self,
        ctx: &RequestContext,
        identity: &Identity,
        candidate: ConfigCandidate,
    ) -> Result<ConfigMetadata, StoreError> {
        self.deps
            .remote
            .save(ctx, identity.clone(), candidate)
            .await
            .map_err(StoreError::backend)
    }

    pub(super) async fn load_remote(
        &self,
        ctx: &RequestContext,
        identity: &Identity,
        id: &ConfigId,
    ) -> Result<Option<AssistantConfig>, StoreError> {
        self.deps
            .remote
            .load(ctx, identity.clone(), id.clone())
            .await
            .map_err(StoreError::backend)
    }

    pub(super) async fn delete_remote(
        &self,
        ctx: &RequestContext,
        identity: &Identity,
        id: &ConfigId,
    ) -> Result<(), StoreError> {
        let deleted = self
            .deps
            .remote
            .delete(ctx, identity.clone(), id.clone())
            .await
            .map_err(StoreError::backend)?;
        if deleted {
            return Ok(());
        }
        Err(StoreError::backend(
            ErrorEnvelope::expected(
                ErrorCode::new("remote", "not_deleted"),
                "remote service did not delete the configuration",
            )
            .with_metadata("configId", id.as_str()),
        ))
    }
}
