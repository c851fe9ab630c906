//! Configuration store: backend routing, the local size gate, and
//! index/record consistency for the local backend.
//!
//! Every public operation resolves its backend once (or takes an explicit
//! `BackendRoute`), checks cancellation at entry, and then runs to
//! completion. Each failure produces exactly one notification; a success
//! produces at most one.

mod error;
mod local;
mod remote;

pub use error::StoreError;

use crate::repair_index::{RepairIndexDeps, RepairReport, repair_local_index};
use profile_store_domain::{AssistantConfig, ConfigDraft, ConfigId, ConfigMetadata, Identity};
use profile_store_ports::{
    IdGeneratorPort, LocalConfigBackendPort, LogFields, LoggerPort, Notification, NotifierPort,
    RemoteConfigPort, SessionPort, Severity,
};
use profile_store_shared::{ErrorEnvelope, RequestContext};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Default local size ceiling: 4.5 MiB.
pub const DEFAULT_SIZE_CEILING_BYTES: u64 = 4_718_592;

/// Backend governing one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRoute {
    /// The on-device key-value store.
    Local,
    /// The account-scoped remote service, for this identity.
    Remote(Identity),
}

impl BackendRoute {
    /// Route implied by an optional identity.
    #[must_use]
    pub fn for_identity(identity: Option<Identity>) -> Self {
        identity.map_or(Self::Local, Self::Remote)
    }

    /// Lowercase label used in logs and CLI output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote(_) => "remote",
        }
    }
}

/// Tunables for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigStoreSettings {
    /// Maximum serialized record size accepted by the local backend.
    pub size_ceiling_bytes: u64,
    /// Display hint for success notifications.
    pub success_duration_ms: u64,
    /// Display hint for warning and error notifications.
    pub error_duration_ms: u64,
}

impl Default for ConfigStoreSettings {
    fn default() -> Self {
        Self {
            size_ceiling_bytes: DEFAULT_SIZE_CEILING_BYTES,
            success_duration_ms: 2_000,
            error_duration_ms: 5_000,
        }
    }
}

/// Dependencies required by the store.
#[derive(Clone)]
pub struct ConfigStoreDeps {
    /// Local record/index backend.
    pub local: Arc<dyn LocalConfigBackendPort>,
    /// Remote account-scoped backend.
    pub remote: Arc<dyn RemoteConfigPort>,
    /// Session oracle.
    pub session: Arc<dyn SessionPort>,
    /// User-facing notification sink.
    pub notifier: Arc<dyn NotifierPort>,
    /// Id minting for local creates.
    pub ids: Arc<dyn IdGeneratorPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Metadata of the stored record (with its assigned id).
    pub metadata: ConfigMetadata,
    /// Backend the record was written to. Reuse it for a follow-up load.
    pub route: BackendRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Save,
    Load,
    Delete,
    Repair,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Save => "save",
            Self::Load => "load",
            Self::Delete => "delete",
            Self::Repair => "repair",
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::List => "list configurations",
            Self::Save => "save the configuration",
            Self::Load => "open the configuration",
            Self::Delete => "delete the configuration",
            Self::Repair => "repair the local index",
        }
    }
}

/// The configuration store use case.
#[derive(Clone)]
pub struct ConfigStore {
    deps: ConfigStoreDeps,
    settings: ConfigStoreSettings,
}

impl ConfigStore {
    /// Build a store from its collaborators.
    #[must_use]
    pub const fn new(deps: ConfigStoreDeps, settings: ConfigStoreSettings) -> Self {
        Self { deps, settings }
    }

    /// Store settings.
    #[must_use]
    pub const fn settings(&self) -> &ConfigStoreSettings {
        &self.settings
    }

    /// Read the session oracle once and pick the backend.
    #[must_use]
    pub fn resolve_route(&self) -> BackendRoute {
        BackendRoute::for_identity(self.deps.session.current_identity())
    }

    /// List metadata on the backend selected by the current session.
    pub async fn get_config_list(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ConfigMetadata>, StoreError> {
        let route = self.resolve_route();
        self.get_config_list_on(ctx, &route).await
    }

    /// List metadata on `route`, sorted by name.
    ///
    /// Backend failures are reported once and yield an empty list; local
    /// state is never used as a fallback for the remote.
    #[tracing::instrument(name = "config_store.list", skip_all, fields(backend = route.label()))]
    pub async fn get_config_list_on(
        &self,
        ctx: &RequestContext,
        route: &BackendRoute,
    ) -> Result<Vec<ConfigMetadata>, StoreError> {
        self.run(ctx, Operation::List, route, None, |work| async move {
            let entries = match route {
                BackendRoute::Local => self.list_local(&work).await,
                BackendRoute::Remote(identity) => self.list_remote(&work, identity).await,
            };
            Ok(entries)
        })
        .await
    }

    /// Save a draft on the backend selected by the current session.
    pub async fn save_config(
        &self,
        ctx: &RequestContext,
        draft: ConfigDraft,
    ) -> Result<SaveOutcome, StoreError> {
        let route = self.resolve_route();
        self.save_config_on(ctx, &route, draft).await
    }

    /// Save a draft on `route`.
    ///
    /// The draft is validated first; an invalid or oversized draft writes
    /// nothing. A local save writes the record, then the index, and restores
    /// the previous record state when the index cannot be updated.
    #[tracing::instrument(name = "config_store.save", skip_all, fields(backend = route.label()))]
    pub async fn save_config_on(
        &self,
        ctx: &RequestContext,
        route: &BackendRoute,
        draft: ConfigDraft,
    ) -> Result<SaveOutcome, StoreError> {
        self.run(ctx, Operation::Save, route, None, |work| async move {
            let candidate = draft.normalize()?;
            let metadata = match route {
                BackendRoute::Local => self.save_local(&work, candidate).await?,
                BackendRoute::Remote(identity) => {
                    self.save_remote(&work, identity, candidate).await?
                },
            };
            Ok(SaveOutcome {
                metadata,
                route: route.clone(),
            })
        })
        .await
    }

    /// Load a record on the backend selected by the current session.
    pub async fn load_config(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
    ) -> Result<AssistantConfig, StoreError> {
        let route = self.resolve_route();
        self.load_config_on(ctx, &route, id).await
    }

    /// Load a record on `route`; absence is `StoreError::NotFound`.
    #[tracing::instrument(name = "config_store.load", skip_all, fields(backend = route.label()))]
    pub async fn load_config_on(
        &self,
        ctx: &RequestContext,
        route: &BackendRoute,
        id: &ConfigId,
    ) -> Result<AssistantConfig, StoreError> {
        self.run(ctx, Operation::Load, route, Some(id), |work| async move {
            let found = match route {
                BackendRoute::Local => self.load_local(&work, id).await?,
                BackendRoute::Remote(identity) => self.load_remote(&work, identity, id).await?,
            };
            found.ok_or_else(|| StoreError::NotFound { id: id.clone() })
        })
        .await
    }

    /// Delete a record on the backend selected by the current session.
    pub async fn delete_config(
        &self,
        ctx: &RequestContext,
        id: &ConfigId,
    ) -> Result<(), StoreError> {
        let route = self.resolve_route();
        self.delete_config_on(ctx, &route, id).await
    }

    /// Delete a record on `route`.
    ///
    /// Locally, deleting an absent id succeeds. If the record is removed but
    /// the index cannot be rewritten, the failure is partial and the index
    /// may keep a stale entry until `repair_local_index` runs.
    #[tracing::instrument(name = "config_store.delete", skip_all, fields(backend = route.label()))]
    pub async fn delete_config_on(
        &self,
        ctx: &RequestContext,
        route: &BackendRoute,
        id: &ConfigId,
    ) -> Result<(), StoreError> {
        self.run(ctx, Operation::Delete, route, Some(id), |work| async move {
            match route {
                BackendRoute::Local => self.delete_local(&work, id).await,
                BackendRoute::Remote(identity) => self.delete_remote(&work, identity, id).await,
            }
        })
        .await
    }

    /// Restore index/record consistency on the local backend.
    #[tracing::instrument(name = "config_store.repair", skip_all)]
    pub async fn repair_local_index(
        &self,
        ctx: &RequestContext,
    ) -> Result<RepairReport, StoreError> {
        let deps = RepairIndexDeps {
            local: Arc::clone(&self.deps.local),
            logger: self.deps.logger.clone(),
        };
        self.run(
            ctx,
            Operation::Repair,
            &BackendRoute::Local,
            None,
            |work| async move {
                repair_local_index(&work, &deps)
                    .await
                    .map_err(StoreError::backend)
            },
        )
        .await
    }

    async fn run<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        route: &BackendRoute,
        config_id: Option<&ConfigId>,
        work: F,
    ) -> Result<T, StoreError>
    where
        T: Outcome,
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let started_at = Instant::now();
        let fields = log_fields_start(ctx, operation, route, config_id);
        self.log_info(
            &event_name(operation, "start"),
            "Config store operation started",
            fields.clone(),
        );

        let result = match ctx.ensure_not_cancelled(operation_tag(operation)) {
            // Past this point the operation runs to completion.
            Ok(()) => work(RequestContext::new(ctx.correlation_id().clone())).await,
            Err(error) => Err(StoreError::backend(error)),
        };

        let duration_ms = duration_ms(started_at);
        match &result {
            Ok(outcome) => {
                let mut completed = fields;
                completed.insert("durationMs".into(), Value::from(duration_ms));
                outcome.annotate(&mut completed);
                self.log_info(
                    &event_name(operation, "completed"),
                    "Config store operation completed",
                    completed,
                );
                if let Some((message, severity)) = outcome.notification(operation) {
                    self.notify(message, severity);
                }
            },
            Err(error) if error.is_cancelled() => {
                let mut aborted = fields;
                aborted.insert("durationMs".into(), Value::from(duration_ms));
                self.log_info(
                    &event_name(operation, "aborted"),
                    "Config store operation aborted",
                    aborted,
                );
            },
            Err(error) => {
                let mut failed = fields;
                failed.insert("durationMs".into(), Value::from(duration_ms));
                failed.insert("errorKind".into(), Value::from(error.kind()));
                if let Some(logger) = self.deps.logger.as_ref() {
                    let envelope = ErrorEnvelope::from(error.clone());
                    logger.error(&event_name(operation, "failed"), &envelope, Some(failed));
                }
                let (message, severity) = failure_notification(operation, error);
                self.notify(message, severity);
            },
        }
        result
    }

    fn notify(&self, message: String, severity: Severity) {
        let duration_hint_ms = match severity {
            Severity::Success | Severity::Info => self.settings.success_duration_ms,
            Severity::Warning | Severity::Error => self.settings.error_duration_ms,
        };
        self.deps.notifier.notify(Notification {
            message: message.into(),
            severity,
            duration_hint_ms,
        });
    }

    fn log_info(&self, event: &str, message: &str, fields: LogFields) {
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.info(event, message, Some(fields));
        }
    }

    fn log_warn(&self, event: &str, message: &str, fields: LogFields) {
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.warn(event, message, Some(fields));
        }
    }
}

/// Per-operation success reporting.
trait Outcome {
    fn notification(&self, _operation: Operation) -> Option<(String, Severity)> {
        None
    }

    fn annotate(&self, _fields: &mut LogFields) {}
}

impl Outcome for Vec<ConfigMetadata> {
    fn annotate(&self, fields: &mut LogFields) {
        fields.insert("count".into(), Value::from(self.len()));
    }
}

impl Outcome for AssistantConfig {}

impl Outcome for SaveOutcome {
    fn notification(&self, _operation: Operation) -> Option<(String, Severity)> {
        Some((
            format!("Saved \"{}\"", self.metadata.name),
            Severity::Success,
        ))
    }

    fn annotate(&self, fields: &mut LogFields) {
        fields.insert("configId".into(), Value::from(self.metadata.id.as_str()));
    }
}

impl Outcome for () {
    fn notification(&self, operation: Operation) -> Option<(String, Severity)> {
        (operation == Operation::Delete)
            .then(|| ("Configuration deleted".to_string(), Severity::Success))
    }
}

impl Outcome for RepairReport {
    fn notification(&self, _operation: Operation) -> Option<(String, Severity)> {
        self.changed().then(|| {
            (
                format!(
                    "Local index repaired: {} dropped, {} adopted, {} discarded",
                    self.dropped.len(),
                    self.adopted.len(),
                    self.discarded.len()
                ),
                Severity::Success,
            )
        })
    }

    fn annotate(&self, fields: &mut LogFields) {
        fields.insert("dropped".into(), Value::from(self.dropped.len()));
        fields.insert("adopted".into(), Value::from(self.adopted.len()));
        fields.insert("discarded".into(), Value::from(self.discarded.len()));
    }
}

fn failure_notification(operation: Operation, error: &StoreError) -> (String, Severity) {
    match error {
        StoreError::Validation(cause) => (
            format!("Configuration is invalid: {cause}"),
            Severity::Warning,
        ),
        StoreError::SizeLimitExceeded { ceiling_bytes, .. } => (
            format!("Configuration is too large to store on this device (limit {ceiling_bytes} bytes)"),
            Severity::Error,
        ),
        StoreError::NotFound { .. } => ("Configuration not found".to_string(), Severity::Warning),
        StoreError::Backend { partial: true, .. } if operation == Operation::Delete => (
            "Configuration deleted, but the list could not be updated".to_string(),
            Severity::Error,
        ),
        StoreError::Backend { partial: true, .. } => (
            format!("Could not {}; local data may need repair", operation.verb()),
            Severity::Error,
        ),
        StoreError::Backend { .. } => (
            format!("Could not {}", operation.verb()),
            Severity::Error,
        ),
    }
}

const fn operation_tag(operation: Operation) -> &'static str {
    match operation {
        Operation::List => "config_store.list",
        Operation::Save => "config_store.save",
        Operation::Load => "config_store.load",
        Operation::Delete => "config_store.delete",
        Operation::Repair => "config_store.repair",
    }
}

fn event_name(operation: Operation, phase: &str) -> String {
    format!("configStore.{}.{phase}", operation.as_str())
}

fn log_fields_start(
    ctx: &RequestContext,
    operation: Operation,
    route: &BackendRoute,
    config_id: Option<&ConfigId>,
) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "correlationId".into(),
        Value::from(ctx.correlation_id().as_str()),
    );
    fields.insert("operation".into(), Value::from(operation.as_str()));
    fields.insert("backend".into(), Value::from(route.label()));
    if let Some(id) = config_id {
        fields.insert("configId".into(), Value::from(id.as_str()));
    }
    fields
}

fn config_fields(id: &ConfigId) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("configId".into(), Value::from(id.as_str()));
    fields
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
