//! Key-value storage boundary contract.
//!
//! Values are opaque UTF-8 text. Implementations persist each `put`
//! durably before resolving and treat `delete` of a missing key as success.

use crate::BoxFuture;
use profile_store_shared::{RequestContext, Result};

/// Boundary contract for a persistent string key-value store.
pub trait KeyValueStorePort: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(
        &self,
        ctx: &RequestContext,
        key: Box<str>,
        value: String,
    ) -> BoxFuture<'_, Result<()>>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>>;

    /// List stored keys starting with `prefix`, in ascending order.
    fn list_keys(
        &self,
        ctx: &RequestContext,
        prefix: Box<str>,
    ) -> BoxFuture<'_, Result<Vec<Box<str>>>>;
}
