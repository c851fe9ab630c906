//! In-process key-value engine.

use profile_store_ports::{BoxFuture, KeyValueStorePort};
use profile_store_shared::{RequestContext, Result};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Volatile engine backed by an ordered map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<BTreeMap<Box<str>, String>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    pub async fn snapshot(&self) -> BTreeMap<Box<str>, String> {
        self.entries.read().await.clone()
    }
}

impl KeyValueStorePort for MemoryKeyValueStore {
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_memory.get")?;
            Ok(self.entries.read().await.get(&key).cloned())
        })
    }

    fn put(
        &self,
        ctx: &RequestContext,
        key: Box<str>,
        value: String,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_memory.put")?;
            self.entries.write().await.insert(key, value);
            Ok(())
        })
    }

    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_memory.delete")?;
            self.entries.write().await.remove(&key);
            Ok(())
        })
    }

    fn list_keys(
        &self,
        ctx: &RequestContext,
        prefix: Box<str>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("kv_memory.list_keys")?;
            let entries = self.entries.read().await;
            Ok(entries
                .range::<str, _>((Bound::Included(prefix.as_ref()), Bound::Unbounded))
                .map(|(key, _)| key)
                .take_while(|key| key.starts_with(prefix.as_ref()))
                .cloned()
                .collect())
        })
    }
}
