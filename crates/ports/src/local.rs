//! Local backend contract: the metadata index plus one record per id.
//!
//! Implementations own key naming and serialization only. Ordering,
//! consistency, and rollback decisions belong to the caller.

use crate::BoxFuture;
use profile_store_domain::{AssistantConfig, ConfigId, ConfigMetadata};
use profile_store_shared::{RequestContext, Result};

/// Metadata index as read from the local store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    /// Entries in stored order.
    pub entries: Vec<ConfigMetadata>,
    /// The stored index existed but could not be decoded.
    pub corrupt: bool,
}

impl LocalIndex {
    /// Index holding `entries`, decoded cleanly.
    #[must_use]
    pub const fn clean(entries: Vec<ConfigMetadata>) -> Self {
        Self {
            entries,
            corrupt: false,
        }
    }
}

/// Boundary contract for the on-device configuration backend.
pub trait LocalConfigBackendPort: Send + Sync {
    /// Read the metadata index. A missing or undecodable index is empty.
    fn get_index(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<LocalIndex>>;

    /// Replace the stored metadata index.
    fn put_index(
        &self,
        ctx: &RequestContext,
        entries: Vec<ConfigMetadata>,
    ) -> BoxFuture<'_, Result<()>>;

    /// Read one full record.
    fn get_record(
        &self,
        ctx: &RequestContext,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>>;

    /// Write one full record under its id.
    fn put_record(
        &self,
        ctx: &RequestContext,
        record: AssistantConfig,
    ) -> BoxFuture<'_, Result<()>>;

    /// Remove one record. Removing an absent record succeeds.
    fn delete_record(&self, ctx: &RequestContext, id: ConfigId) -> BoxFuture<'_, Result<()>>;

    /// Ids of every stored record, ascending.
    fn list_record_ids(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<ConfigId>>>;
}
