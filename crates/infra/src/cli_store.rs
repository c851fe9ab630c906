//! CLI orchestration helpers: load config, wire the store, run one
//! operation on a single-threaded runtime.

use crate::composition::{StoreObservers, build_config_store, runtime_error};
use crate::observability::scope_logger;
use crate::{InfraError, InfraResult};
use profile_store_app::{ConfigStore, RepairReport, SaveOutcome};
use profile_store_config::{
    StoreEnv, ValidatedSaveConfigRequest, ValidatedStoreConfig, load_store_config_from_path,
    save_config_request_schema,
};
use profile_store_domain::{AssistantConfig, ConfigId, ConfigMetadata};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext};
use std::future::Future;
use std::path::PathBuf;

/// Inputs shared by every store command.
#[derive(Clone, Default)]
pub struct StoreCommandOptions {
    /// Optional config file (JSON or TOML).
    pub config_path: Option<PathBuf>,
    /// Optional partial config applied over the file.
    pub overrides_json: Option<String>,
    /// Directory that relative local paths resolve against; defaults to the
    /// working directory.
    pub base_dir: Option<PathBuf>,
    /// Logger and notifier.
    pub observers: StoreObservers,
}

/// Result of `list`.
#[derive(Debug, Clone)]
pub struct ListOutput {
    /// Backend label (`local` or `remote`).
    pub backend: &'static str,
    /// Entries sorted by name.
    pub entries: Vec<ConfigMetadata>,
}

/// List configurations on the backend selected by the session.
pub fn run_list(options: &StoreCommandOptions) -> InfraResult<ListOutput> {
    with_store(options, |store, ctx| async move {
        let route = store.resolve_route();
        let entries = store
            .get_config_list_on(&ctx, &route)
            .await
            .map_err(ErrorEnvelope::from)?;
        Ok(ListOutput {
            backend: route.label(),
            entries,
        })
    })
}

/// Save a validated draft.
pub fn run_save(
    options: &StoreCommandOptions,
    request: ValidatedSaveConfigRequest,
) -> InfraResult<SaveOutcome> {
    let draft = request.into_inner();
    with_store(options, |store, ctx| async move {
        store
            .save_config(&ctx, draft)
            .await
            .map_err(ErrorEnvelope::from)
    })
}

/// Load one configuration.
pub fn run_show(options: &StoreCommandOptions, id: &ConfigId) -> InfraResult<AssistantConfig> {
    let id = id.clone();
    with_store(options, |store, ctx| async move {
        store
            .load_config(&ctx, &id)
            .await
            .map_err(ErrorEnvelope::from)
    })
}

/// Delete one configuration.
pub fn run_delete(options: &StoreCommandOptions, id: &ConfigId) -> InfraResult<()> {
    let id = id.clone();
    with_store(options, |store, ctx| async move {
        store
            .delete_config(&ctx, &id)
            .await
            .map_err(ErrorEnvelope::from)
    })
}

/// Repair the local index.
pub fn run_repair(options: &StoreCommandOptions) -> InfraResult<RepairReport> {
    with_store(options, |store, ctx| async move {
        store
            .repair_local_index(&ctx)
            .await
            .map_err(ErrorEnvelope::from)
    })
}

/// JSON schema of the draft accepted by `save`, pretty-printed.
pub fn save_request_schema_json() -> InfraResult<String> {
    let mut output =
        serde_json::to_string_pretty(&save_config_request_schema()).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                format!("failed to serialize schema: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
    output.push('\n');
    Ok(output)
}

fn load_config_with_env(
    options: &StoreCommandOptions,
) -> InfraResult<(ValidatedStoreConfig, StoreEnv)> {
    let env = StoreEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    let config = load_store_config_from_path(
        options.config_path.as_deref(),
        options.overrides_json.as_deref(),
        &env,
    )?;
    Ok((config, env))
}

fn with_store<T, F, Fut>(options: &StoreCommandOptions, op: F) -> InfraResult<T>
where
    F: FnOnce(ConfigStore, RequestContext) -> Fut,
    Fut: Future<Output = InfraResult<T>>,
{
    let (config, env) = load_config_with_env(options)?;
    let base_dir = match options.base_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(InfraError::from)?,
    };
    let ctx = RequestContext::new_request();
    let observers = StoreObservers {
        logger: scope_logger(options.observers.logger.as_ref(), &ctx),
        notifier: options.observers.notifier.clone(),
    };
    let built = build_config_store(&config, &env, &base_dir, observers)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| runtime_error(&error))?;
    runtime.block_on(op(built.store, ctx))
}
