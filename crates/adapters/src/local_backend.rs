//! Local record/index backend over any key-value engine.
//!
//! Layout: one key holds the JSON metadata index; one key per record id
//! (`record_prefix + id`) holds the JSON record. No ordering or rollback
//! decisions are made here.

use profile_store_domain::{AssistantConfig, ConfigId, ConfigMetadata};
use profile_store_ports::{BoxFuture, KeyValueStorePort, LocalConfigBackendPort, LocalIndex};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::sync::Arc;

/// Default key of the metadata index.
pub const DEFAULT_INDEX_KEY: &str = "assistant_configs.index";
/// Default prefix of record keys.
pub const DEFAULT_RECORD_KEY_PREFIX: &str = "assistant_configs.record.";

/// Key naming for the index and records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    /// Key of the metadata index.
    pub index_key: Box<str>,
    /// Prefix of every record key.
    pub record_prefix: Box<str>,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            index_key: DEFAULT_INDEX_KEY.into(),
            record_prefix: DEFAULT_RECORD_KEY_PREFIX.into(),
        }
    }
}

impl KeyLayout {
    /// Storage key of the record with `id`.
    #[must_use]
    pub fn record_key(&self, id: &ConfigId) -> Box<str> {
        format!("{}{}", self.record_prefix, id.as_str()).into_boxed_str()
    }
}

/// `LocalConfigBackendPort` implementation over a `KeyValueStorePort`.
#[derive(Clone)]
pub struct KvLocalBackend {
    store: Arc<dyn KeyValueStorePort>,
    layout: KeyLayout,
}

impl KvLocalBackend {
    /// Create a backend using `layout` inside `store`.
    pub fn new(store: Arc<dyn KeyValueStorePort>, layout: KeyLayout) -> Self {
        Self { store, layout }
    }

    /// Key naming in use.
    #[must_use]
    pub const fn layout(&self) -> &KeyLayout {
        &self.layout
    }
}

impl LocalConfigBackendPort for KvLocalBackend {
    fn get_index(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<LocalIndex>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let raw = self.store.get(&ctx, self.layout.index_key.clone()).await?;
            let Some(raw) = raw else {
                return Ok(LocalIndex::default());
            };
            Ok(serde_json::from_str::<Vec<ConfigMetadata>>(&raw).map_or_else(
                |_| LocalIndex {
                    entries: Vec::new(),
                    corrupt: true,
                },
                LocalIndex::clean,
            ))
        })
    }

    fn put_index(
        &self,
        ctx: &RequestContext,
        entries: Vec<ConfigMetadata>,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let encoded = serde_json::to_string(&entries)
                .map_err(|error| encode_error("local_backend.put_index", &error))?;
            self.store
                .put(&ctx, self.layout.index_key.clone(), encoded)
                .await
        })
    }

    fn get_record(
        &self,
        ctx: &RequestContext,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let Some(raw) = self.store.get(&ctx, self.layout.record_key(&id)).await? else {
                return Ok(None);
            };
            let record: AssistantConfig = serde_json::from_str(&raw).map_err(|error| {
                corrupt_record(&id, &format!("stored record is not readable: {error}"))
            })?;
            if record.id != id {
                return Err(corrupt_record(&id, "stored record id does not match its key"));
            }
            Ok(Some(record))
        })
    }

    fn put_record(
        &self,
        ctx: &RequestContext,
        record: AssistantConfig,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let encoded = serde_json::to_string(&record)
                .map_err(|error| encode_error("local_backend.put_record", &error))?;
            self.store
                .put(&ctx, self.layout.record_key(&record.id), encoded)
                .await
        })
    }

    fn delete_record(&self, ctx: &RequestContext, id: ConfigId) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move { self.store.delete(&ctx, self.layout.record_key(&id)).await })
    }

    fn list_record_ids(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<ConfigId>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let prefix = self.layout.record_prefix.clone();
            let keys = self.store.list_keys(&ctx, prefix.clone()).await?;
            Ok(keys
                .iter()
                .filter_map(|key| key.strip_prefix(prefix.as_ref()))
                .filter_map(|raw| ConfigId::parse(raw).ok())
                .collect())
        })
    }
}

fn encode_error(operation: &'static str, error: &serde_json::Error) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("local", "encode_failed"),
        format!("failed to encode: {error}"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("operation", operation)
}

fn corrupt_record(id: &ConfigId, message: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("local", "corrupt_record"),
        message,
        ErrorClass::NonRetriable,
    )
    .with_metadata("configId", id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::memory::MemoryKeyValueStore;
    use profile_store_domain::ConfigDraft;

    fn backend() -> (MemoryKeyValueStore, KvLocalBackend) {
        let store = MemoryKeyValueStore::new();
        let backend = KvLocalBackend::new(Arc::new(store.clone()), KeyLayout::default());
        (store, backend)
    }

    fn record(id: &str, name: &str) -> Result<AssistantConfig> {
        let candidate = ConfigDraft::named(name)
            .normalize()
            .map_err(ErrorEnvelope::from)?;
        Ok(candidate.into_record(ConfigId::parse(id).map_err(ErrorEnvelope::from)?))
    }

    #[tokio::test]
    async fn missing_index_reads_as_clean_empty() -> Result<()> {
        let (_, backend) = backend();
        let index = backend.get_index(&RequestContext::new_request()).await?;
        assert_eq!(index, LocalIndex::default());
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_index_is_flagged_corrupt() -> Result<()> {
        let (store, backend) = backend();
        let ctx = RequestContext::new_request();
        store
            .put(&ctx, DEFAULT_INDEX_KEY.into(), "{not json".to_string())
            .await?;

        let index = backend.get_index(&ctx).await?;
        assert!(index.corrupt);
        assert!(index.entries.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn records_live_under_prefixed_keys() -> Result<()> {
        let (store, backend) = backend();
        let ctx = RequestContext::new_request();
        backend.put_record(&ctx, record("a1", "Alpha")?).await?;
        backend.put_record(&ctx, record("b1", "Beta")?).await?;

        let keys: Vec<Box<str>> = store.snapshot().await.into_keys().collect();
        assert_eq!(
            keys,
            vec![
                Box::from("assistant_configs.record.a1"),
                Box::from("assistant_configs.record.b1"),
            ]
        );
        let ids = backend.list_record_ids(&ctx).await?;
        assert_eq!(ids.len(), 2);

        let loaded = backend
            .get_record(&ctx, ConfigId::parse("a1").map_err(ErrorEnvelope::from)?)
            .await?;
        assert_eq!(loaded, Some(record("a1", "Alpha")?));
        Ok(())
    }

    #[tokio::test]
    async fn record_under_wrong_key_is_corrupt() -> Result<()> {
        let (store, backend) = backend();
        let ctx = RequestContext::new_request();
        let encoded = serde_json::to_string(&record("other", "X")?)
            .map_err(|error| encode_error("test", &error))?;
        store
            .put(&ctx, "assistant_configs.record.a1".into(), encoded)
            .await?;

        let result = backend
            .get_record(&ctx, ConfigId::parse("a1").map_err(ErrorEnvelope::from)?)
            .await;
        assert!(matches!(
            result,
            Err(error) if error.code == ErrorCode::new("local", "corrupt_record")
        ));
        Ok(())
    }
}
