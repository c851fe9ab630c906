//! Shared wiring for configuration store integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use profile_store_adapters::{KeyLayout, KvLocalBackend};
use profile_store_app::{ConfigStore, ConfigStoreDeps, ConfigStoreSettings};
use profile_store_domain::{ConfigId, ConfigMetadata};
use profile_store_ports::{KeyValueStorePort, Severity};
use profile_store_shared::{ErrorEnvelope, Result};
use profile_store_testkit::{
    FaultyKeyValueStore, InMemoryKeyValueStore, InMemoryRemote, RecordingLogger,
    RecordingNotifier, SequentialIds, ToggleSession,
};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const INDEX_KEY: &str = "assistant_configs.index";
pub const RECORD_PREFIX: &str = "assistant_configs.record.";

pub struct Harness {
    pub raw: InMemoryKeyValueStore,
    pub faults: FaultyKeyValueStore,
    pub remote: InMemoryRemote,
    pub session: ToggleSession,
    pub notifier: RecordingNotifier,
    pub logger: RecordingLogger,
    pub store: ConfigStore,
}

pub fn harness() -> Harness {
    harness_with(ConfigStoreSettings::default())
}

pub fn harness_with(settings: ConfigStoreSettings) -> Harness {
    let raw = InMemoryKeyValueStore::new();
    let faults = FaultyKeyValueStore::new(Arc::new(raw.clone()));
    let kv: Arc<dyn KeyValueStorePort> = Arc::new(faults.clone());
    let remote = InMemoryRemote::new();
    let session = ToggleSession::signed_out();
    let notifier = RecordingNotifier::new();
    let logger = RecordingLogger::new();

    let store = ConfigStore::new(
        ConfigStoreDeps {
            local: Arc::new(KvLocalBackend::new(kv, KeyLayout::default())),
            remote: Arc::new(remote.clone()),
            session: Arc::new(session.clone()),
            notifier: Arc::new(notifier.clone()),
            ids: Arc::new(SequentialIds::new("cfg")),
            logger: Some(Arc::new(logger.clone())),
        },
        settings,
    );

    Harness {
        raw,
        faults,
        remote,
        session,
        notifier,
        logger,
        store,
    }
}

impl Harness {
    /// Ids of stored local records, from the raw key space.
    pub fn record_ids(&self) -> BTreeSet<String> {
        self.raw
            .snapshot()
            .keys()
            .filter_map(|key| key.strip_prefix(RECORD_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// Stored local index, decoded from the raw key space.
    pub fn index_entries(&self) -> Vec<ConfigMetadata> {
        self.raw
            .snapshot()
            .get(INDEX_KEY)
            .map(|raw| serde_json::from_str(raw).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Severities of delivered notifications, draining them.
    pub fn take_severities(&self) -> Vec<Severity> {
        self.notifier
            .take()
            .into_iter()
            .map(|notification| notification.severity)
            .collect()
    }
}

pub fn config_id(raw: &str) -> Result<ConfigId> {
    ConfigId::parse(raw).map_err(ErrorEnvelope::from)
}
