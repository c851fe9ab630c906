//! Composition root: builds a `ConfigStore` from a validated config.

use crate::{InfraError, InfraResult};
use profile_store_adapters::{
    ConsoleNotifier, FileKeyValueStore, HttpRemoteConfig, HttpRemoteConfigStore, KeyLayout,
    KvLocalBackend, MemoryKeyValueStore, SqliteKeyValueStore, StaticSession, UnconfiguredRemote,
    UuidIdGenerator,
};
use profile_store_app::{ConfigStore, ConfigStoreDeps, ConfigStoreSettings};
use profile_store_config::{LocalProvider, StoreEnv, ValidatedStoreConfig};
use profile_store_domain::Identity;
use profile_store_ports::{KeyValueStorePort, LoggerPort, NotifierPort, RemoteConfigPort};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;
use std::sync::Arc;

/// Optional observers injected into the store.
///
/// A missing notifier defaults to the stderr console notifier; a missing
/// logger disables structured logging.
#[derive(Clone, Default)]
pub struct StoreObservers {
    /// Structured logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
    /// Notification sink.
    pub notifier: Option<Arc<dyn NotifierPort>>,
}

/// Store plus the session handle it reads.
pub struct BuiltStore {
    /// The configured store.
    pub store: ConfigStore,
    /// Shared session holder; signing in or out here changes routing.
    pub session: StaticSession,
}

/// Wire every adapter selected by `config`.
///
/// Relative local paths resolve against `base_dir`. The remote bearer token
/// comes from `env` only and never from the config file.
pub fn build_config_store(
    config: &ValidatedStoreConfig,
    env: &StoreEnv,
    base_dir: &Path,
    observers: StoreObservers,
) -> InfraResult<BuiltStore> {
    let kv = build_key_value_store(config, base_dir)?;
    let layout = KeyLayout {
        index_key: config.local.index_key.clone().into_boxed_str(),
        record_prefix: config.local.record_key_prefix.clone().into_boxed_str(),
    };
    let session = StaticSession::new(session_identity(config)?);
    let remote = build_remote(config, env)?;
    let notifier = observers
        .notifier
        .unwrap_or_else(|| Arc::new(ConsoleNotifier::stderr()));

    let settings = ConfigStoreSettings {
        size_ceiling_bytes: config.limits().size_ceiling_bytes.get(),
        success_duration_ms: config.notifications.success_duration_ms,
        error_duration_ms: config.notifications.error_duration_ms,
    };
    let store = ConfigStore::new(
        ConfigStoreDeps {
            local: Arc::new(KvLocalBackend::new(kv, layout)),
            remote,
            session: Arc::new(session.clone()),
            notifier,
            ids: Arc::new(UuidIdGenerator),
            logger: observers.logger,
        },
        settings,
    );
    tracing::debug!(
        provider = config.local.provider.as_str(),
        remote = config.remote.base_url.is_some(),
        "config store wired"
    );

    Ok(BuiltStore { store, session })
}

/// Select the key-value engine behind the local backend.
pub fn build_key_value_store(
    config: &ValidatedStoreConfig,
    base_dir: &Path,
) -> InfraResult<Arc<dyn KeyValueStorePort>> {
    let provider = config.local.provider;
    let location = provider.resolve_location(&config.local.path, base_dir);
    match (provider, location) {
        (LocalProvider::Memory, _) => Ok(Arc::new(MemoryKeyValueStore::new())),
        (LocalProvider::File, Some(root)) => Ok(Arc::new(FileKeyValueStore::new(root))),
        (LocalProvider::Sqlite, Some(path)) => Ok(Arc::new(SqliteKeyValueStore::new(path))),
        (LocalProvider::File | LocalProvider::Sqlite, None) => Err(ErrorEnvelope::invariant(
            ErrorCode::new("infra", "local_path_unresolved"),
            "local provider requires a storage path",
        )
        .with_metadata("provider", provider.as_str())),
    }
}

fn build_remote(
    config: &ValidatedStoreConfig,
    env: &StoreEnv,
) -> InfraResult<Arc<dyn RemoteConfigPort>> {
    let Some(base_url) = config.remote.base_url.clone() else {
        return Ok(Arc::new(UnconfiguredRemote));
    };
    let remote = HttpRemoteConfigStore::new(&HttpRemoteConfig {
        base_url,
        timeout_ms: config.limits().remote_timeout_ms.get(),
        api_token: env.remote_api_token.clone(),
    })?;
    Ok(Arc::new(remote))
}

fn session_identity(config: &ValidatedStoreConfig) -> InfraResult<Option<Identity>> {
    config
        .session
        .identity
        .as_deref()
        .map(|raw| {
            Identity::parse(raw).map_err(|error| {
                InfraError::from(error).with_metadata("field", "session.identity")
            })
        })
        .transpose()
}

/// Error returned when the async runtime cannot start.
pub(crate) fn runtime_error(error: &std::io::Error) -> InfraError {
    ErrorEnvelope::unexpected(
        ErrorCode::new("infra", "runtime_start"),
        format!("failed to start async runtime: {error}"),
        ErrorClass::NonRetriable,
    )
}
