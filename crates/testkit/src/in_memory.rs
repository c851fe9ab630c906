//! In-memory doubles for every port contract.
//!
//! These implementations are intended for:
//! - Unit/integration tests of the configuration store
//! - Fault injection at the key-value and remote boundaries
//! - Asserting on emitted notifications and log events

use crate::errors::{injected_fault, remote_unavailable};
use profile_store_domain::{AssistantConfig, ConfigCandidate, ConfigId, ConfigMetadata, Identity};
use profile_store_ports::{
    BoxFuture, IdGeneratorPort, KeyValueStorePort, LogEvent, LogFields, LoggerPort, Notification,
    NotifierPort, RemoteConfigPort, SessionPort,
};
use profile_store_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// Logger that keeps every event in memory. Children share the buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
    base_fields: LogFields,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event.
    pub fn events(&self) -> Vec<LogEvent> {
        lock(&self.events).clone()
    }

    /// Recorded event names, in emission order.
    pub fn event_names(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .map(|event| event.event.to_string())
            .collect()
    }

    /// Whether an event with `name` was recorded.
    pub fn has_event(&self, name: &str) -> bool {
        lock(&self.events)
            .iter()
            .any(|event| event.event.as_ref() == name)
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, mut event: LogEvent) {
        if !self.base_fields.is_empty() {
            let mut fields = self.base_fields.clone();
            fields.extend(event.fields.take().unwrap_or_default());
            event.fields = Some(fields);
        }
        lock(&self.events).push(event);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            events: Arc::clone(&self.events),
            base_fields: merged,
        })
    }
}

/// Notifier that records every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of delivered notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.delivered).clone()
    }

    /// Drain delivered notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.delivered))
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.delivered).push(notification);
    }
}

/// Session oracle that tests can sign in and out, counting reads.
#[derive(Debug, Clone, Default)]
pub struct ToggleSession {
    identity: Arc<Mutex<Option<Identity>>>,
    reads: Arc<AtomicUsize>,
}

impl ToggleSession {
    /// A signed-out session.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A session signed in as `identity`.
    pub fn signed_in(identity: &str) -> Self {
        let session = Self::default();
        session.sign_in(identity);
        session
    }

    /// Sign in as `identity`.
    pub fn sign_in(&self, identity: &str) {
        *lock(&self.identity) = Identity::parse(identity).ok();
    }

    /// Sign out.
    pub fn sign_out(&self) {
        *lock(&self.identity) = None;
    }

    /// Number of `current_identity` reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SessionPort for ToggleSession {
    fn current_identity(&self) -> Option<Identity> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        lock(&self.identity).clone()
    }
}

/// Deterministic id generator: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: Box<str>,
    next: AtomicU64,
}

impl SequentialIds {
    /// Create a generator with `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("cfg")
    }
}

impl IdGeneratorPort for SequentialIds {
    fn next_id(&self) -> Result<ConfigId> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        ConfigId::parse(format!("{}-{n}", self.prefix)).map_err(ErrorEnvelope::from)
    }
}

/// Key-value operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KvOp {
    /// `get`.
    Get,
    /// `put`.
    Put,
    /// `delete`.
    Delete,
    /// `list_keys`.
    ListKeys,
}

impl KvOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::ListKeys => "list_keys",
        }
    }
}

/// Wraps a key-value store and fails selected operations on demand.
///
/// Successful mutations are journaled as `"put <key>"` / `"delete <key>"`.
#[derive(Clone)]
pub struct FaultyKeyValueStore {
    inner: Arc<dyn KeyValueStorePort>,
    faults: Arc<Mutex<Vec<(KvOp, Box<str>)>>>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl FaultyKeyValueStore {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            inner,
            faults: Arc::default(),
            journal: Arc::default(),
        }
    }

    /// Fail `op` for every key starting with `key_prefix` until cleared.
    pub fn fail_on(&self, op: KvOp, key_prefix: &str) {
        lock(&self.faults).push((op, key_prefix.into()));
    }

    /// Disarm every fault.
    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    /// Successful mutations, in order.
    pub fn journal(&self) -> Vec<String> {
        lock(&self.journal).clone()
    }

    fn check(&self, op: KvOp, key: &str) -> Result<()> {
        let armed = lock(&self.faults)
            .iter()
            .any(|(fault_op, prefix)| *fault_op == op && key.starts_with(prefix.as_ref()));
        if armed {
            return Err(injected_fault(&format!("kv.{}", op.as_str())));
        }
        Ok(())
    }

    fn record(&self, op: KvOp, key: &str) {
        lock(&self.journal).push(format!("{} {key}", op.as_str()));
    }
}

impl KeyValueStorePort for FaultyKeyValueStore {
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.check(KvOp::Get, &key)?;
            self.inner.get(&ctx, key).await
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
            self.check(KvOp::Put, &key)?;
            self.inner.put(&ctx, key.clone(), value).await?;
            self.record(KvOp::Put, &key);
            Ok(())
        })
    }

    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.check(KvOp::Delete, &key)?;
            self.inner.delete(&ctx, key.clone()).await?;
            self.record(KvOp::Delete, &key);
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
            self.check(KvOp::ListKeys, &prefix)?;
            self.inner.list_keys(&ctx, prefix).await
        })
    }
}

/// Remote operations that can be switched to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RemoteOp {
    /// `list`.
    List,
    /// `save`.
    Save,
    /// `load`.
    Load,
    /// `delete`.
    Delete,
}

#[derive(Debug, Default)]
struct RemoteState {
    records: BTreeMap<(Identity, ConfigId), AssistantConfig>,
    failing: BTreeSet<RemoteOp>,
    calls: Vec<(RemoteOp, Identity)>,
    minted: u64,
}

/// Account-scoped remote held in memory.
///
/// Records are partitioned by identity. `list` returns entries in id order
/// (not name order). Creates mint `remote-<n>` ids; replacing an unknown id
/// is rejected like a real service would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl InMemoryRemote {
    /// Create an empty remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail with a retriable outage until recovered.
    pub fn fail(&self, op: RemoteOp) {
        lock(&self.state).failing.insert(op);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: RemoteOp) {
        lock(&self.state).failing.remove(&op);
    }

    /// Every call received, with the identity it was scoped to.
    pub fn calls(&self) -> Vec<(RemoteOp, Identity)> {
        lock(&self.state).calls.clone()
    }

    /// Records currently owned by `identity`.
    pub fn records_for(&self, identity: &Identity) -> Vec<AssistantConfig> {
        lock(&self.state)
            .records
            .iter()
            .filter(|((owner, _), _)| owner == identity)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Insert a record directly, bypassing call accounting.
    pub fn seed(&self, identity: &Identity, record: AssistantConfig) {
        lock(&self.state)
            .records
            .insert((identity.clone(), record.id.clone()), record);
    }

    fn enter(&self, op: RemoteOp, identity: &Identity, name: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push((op, identity.clone()));
        if state.failing.contains(&op) {
            return Err(remote_unavailable(name));
        }
        Ok(())
    }
}

impl RemoteConfigPort for InMemoryRemote {
    fn list(
        &self,
        ctx: &RequestContext,
        identity: Identity,
    ) -> BoxFuture<'_, Result<Vec<ConfigMetadata>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_remote.list")?;
            self.enter(RemoteOp::List, &identity, "in_memory_remote.list")?;
            Ok(self
                .records_for(&identity)
                .iter()
                .map(AssistantConfig::metadata)
                .collect())
        })
    }

    fn save(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        candidate: ConfigCandidate,
    ) -> BoxFuture<'_, Result<ConfigMetadata>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_remote.save")?;
            self.enter(RemoteOp::Save, &identity, "in_memory_remote.save")?;
            let mut state = lock(&self.state);
            let id = match candidate.id.clone() {
                Some(id) => {
                    if !state.records.contains_key(&(identity.clone(), id.clone())) {
                        return Err(ErrorEnvelope::expected(
                            ErrorCode::new("remote", "rejected"),
                            "unknown configuration id",
                        )
                        .with_metadata("configId", id.as_str()));
                    }
                    id
                },
                None => {
                    state.minted += 1;
                    ConfigId::parse(format!("remote-{}", state.minted))
                        .map_err(ErrorEnvelope::from)?
                },
            };
            let record = candidate.into_record(id.clone());
            let metadata = record.metadata();
            state.records.insert((identity, id), record);
            Ok(metadata)
        })
    }

    fn load(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<Option<AssistantConfig>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_remote.load")?;
            self.enter(RemoteOp::Load, &identity, "in_memory_remote.load")?;
            Ok(lock(&self.state).records.get(&(identity, id)).cloned())
        })
    }

    fn delete(
        &self,
        ctx: &RequestContext,
        identity: Identity,
        id: ConfigId,
    ) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_remote.delete")?;
            self.enter(RemoteOp::Delete, &identity, "in_memory_remote.delete")?;
            Ok(lock(&self.state).records.remove(&(identity, id)).is_some())
        })
    }
}

/// Key-value store held in a `BTreeMap`, for tests that must not depend on
/// the adapters crate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<BTreeMap<Box<str>, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<Box<str>, String> {
        lock(&self.entries).clone()
    }

    /// Overwrite a raw value, bypassing the port.
    pub fn insert_raw(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.into(), value.to_string());
    }
}

impl KeyValueStorePort for InMemoryKeyValueStore {
    fn get(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<Option<String>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_kv.get")?;
            Ok(lock(&self.entries).get(&key).cloned())
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
            ctx.ensure_not_cancelled("in_memory_kv.put")?;
            lock(&self.entries).insert(key, value);
            Ok(())
        })
    }

    fn delete(&self, ctx: &RequestContext, key: Box<str>) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_kv.delete")?;
            lock(&self.entries).remove(&key);
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
            ctx.ensure_not_cancelled("in_memory_kv.list_keys")?;
            Ok(lock(&self.entries)
                .keys()
                .filter(|key| key.starts_with(prefix.as_ref()))
                .cloned()
                .collect())
        })
    }
}
