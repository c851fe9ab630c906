//! Local backend path: size gate, record-then-index writes, rollback.

use super::{ConfigStore, StoreError, config_fields};
use profile_store_domain::{
    AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, estimate_serialized_size,
    remove_metadata, sort_metadata, upsert_metadata,
};
use profile_store_ports::{LogFields, Severity};
use profile_store_shared::{ErrorCode, ErrorEnvelope, RequestContext};
use serde_json::Value;

fn index_unreadable() -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("local", "index_corrupt"),
        "local index is unreadable; run repair before saving",
    )
}

impl ConfigStore {
    pub(super) async fn list_local(&self, ctx: &RequestContext) -> Vec<ConfigMetadata> {
        match self.deps.local.get_index(ctx).await {
            Ok(index) => {
                if index.corrupt {
                    self.log_warn(
                        "configStore.list.indexCorrupt",
                        "Local index is unreadable; listing as empty",
                        LogFields::new(),
                    );
                }
                let mut entries = index.entries;
                sort_metadata(&mut entries);
                entries
            },
            Err(error) => {
                self.report_degraded_list(&error, "Could not read configurations on this device");
                Vec::new()
            },
        }
    }

    pub(super) async fn save_local(
        &self,
        ctx: &RequestContext,
        candidate: ConfigCandidate,
    ) -> Result<ConfigMetadata, StoreError> {
        let is_update = candidate.id.is_some();
        let id = match candidate.id.clone() {
            Some(id) => id,
            None => self.deps.ids.next_id().map_err(StoreError::backend)?,
        };
        let record = candidate.into_record(id.clone());

        let size_bytes = estimate_serialized_size(&record);
        let ceiling_bytes = self.settings.size_ceiling_bytes;
        if size_bytes > ceiling_bytes {
            return Err(StoreError::SizeLimitExceeded {
                size_bytes,
                ceiling_bytes,
            });
        }

        let previous = if is_update {
            self.previous_record(ctx, &id).await
        } else {
            None
        };

        let metadata = record.metadata();
        self.deps
            .local
            .put_record(ctx, record)
            .await
            .map_err(StoreError::backend)?;

        match self.commit_index_entry(ctx, metadata.clone()).await {
            Ok(()) => Ok(metadata),
            Err(error) => Err(self.roll_back_record(ctx, &id, previous, error).await),
        }
    }

    /// Stored record an update replaces, kept for rollback.
    ///
    /// An unreadable record does not block the replace; a failed update then
    /// compensates like a create.
    async fn previous_record(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
    ) -> Option<AssistantConfig> {
        match self.deps.local.get_record(ctx, id.clone()).await {
            Ok(previous) => previous,
            Err(error) => {
                let mut fields = config_fields(id);
                fields.insert("cause".into(), Value::from(error.code.to_string()));
                self.log_warn(
                    "configStore.save.previousUnreadable",
                    "Stored record is unreadable; replacing it",
                    fields,
                );
                None
            },
        }
    }

    async fn commit_index_entry(
        &self,
        ctx: &RequestContext,
        entry: ConfigMetadata,
    ) -> Result<(), ErrorEnvelope> {
        let index = self.deps.local.get_index(ctx).await?;
        if index.corrupt {
            return Err(index_unreadable());
        }
        let mut entries = index.entries;
        upsert_metadata(&mut entries, entry);
        self.deps.local.put_index(ctx, entries).await
    }

    /// Undo a record write whose index update failed.
    ///
    /// Updates get their previous record back; creates are removed.
    async fn roll_back_record(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
        previous: Option<AssistantConfig>,
        cause: ErrorEnvelope,
    ) -> StoreError {
        let restoring = previous.is_some();
        let undo = match previous {
            Some(record) => self.deps.local.put_record(ctx, record).await,
            None => self.deps.local.delete_record(ctx, id.clone()).await,
        };

        let mut fields = config_fields(id);
        fields.insert("restoredPrevious".into(), Value::from(restoring));
        match undo {
            Ok(()) => {
                self.log_warn(
                    "configStore.save.rollback",
                    "Index update failed; record write rolled back",
                    fields,
                );
                StoreError::backend(cause)
            },
            Err(undo_error) => {
                if let Some(logger) = self.deps.logger.as_ref() {
                    logger.error("configStore.save.rollbackFailed", &undo_error, Some(fields));
                }
                StoreError::partial(
                    cause
                        .with_metadata("rollback", "failed")
                        .with_metadata("orphanedRecord", "true"),
                )
            },
        }
    }

    pub(super) async fn load_local(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
    ) -> Result<Option<AssistantConfig>, StoreError> {
        self.deps
            .local
            .get_record(ctx, id.clone())
            .await
            .map_err(StoreError::backend)
    }

    pub(super) async fn delete_local(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
    ) -> Result<(), StoreError> {
        self.deps
            .local
            .delete_record(ctx, id.clone())
            .await
            .map_err(StoreError::backend)?;

        let index = match self.deps.local.get_index(ctx).await {
            Ok(index) => index,
            Err(error) => return Err(self.index_stale(id, error)),
        };
        if index.corrupt {
            self.log_warn(
                "configStore.delete.indexCorrupt",
                "Local index is unreadable; record removed without index update",
                config_fields(id),
            );
            return Ok(());
        }

        let mut entries = index.entries;
        if !remove_metadata(&mut entries, id) {
            return Ok(());
        }
        self.deps
            .local
            .put_index(ctx, entries)
            .await
            .map_err(|error| self.index_stale(id, error))
    }

    fn index_stale(&self, id: &ConfigId, error: ErrorEnvelope) -> StoreError {
        self.log_warn(
            "configStore.delete.indexStale",
            "Record removed but the index still lists it",
            config_fields(id),
        );
        StoreError::partial(error.with_metadata("indexStale", "true"))
    }

    pub(super) fn report_degraded_list(&self, error: &ErrorEnvelope, message: &str) {
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.error("configStore.list.degraded", error, None);
        }
        self.notify(message.to_string(), Severity::Error);
    }
}
