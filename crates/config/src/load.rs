//! Config loading helpers (env + file + overrides).
//!
//! The loader owns the merge order and surfaces user-facing errors as typed
//! `ErrorEnvelope`s.

use crate::storage::LocalProvider;
use crate::{StoreConfig, StoreEnv, ValidatedStoreConfig, apply_env_overrides};
use profile_store_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the store config from in-memory sources.
///
/// Precedence (highest wins):
/// - env overrides (`StoreEnv`)
/// - overrides JSON (partial config)
/// - config JSON (file content)
/// - defaults (`StoreConfig::default()`)
pub fn load_store_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &StoreEnv,
) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let config = match config_json {
        None => StoreConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };
    merge_and_validate(config, overrides_json, env)
}

/// Load the store config from an optional file path (`.json` or `.toml`).
pub fn load_store_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &StoreEnv,
) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let config = match config_path {
        None => StoreConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&read_config_file(path)?, format)?
        },
    };
    merge_and_validate(config, overrides_json, env)
}

/// Load the store config from std env and an optional file path.
pub fn load_store_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let env = StoreEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_store_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &StoreConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &StoreConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn merge_and_validate(
    mut config: StoreConfig,
    overrides_json: Option<&str>,
    env: &StoreEnv,
) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        apply_overrides(&mut config, overrides);
    }

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<StoreConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<StoreConfigOverrides, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct StoreConfigOverrides {
    version: Option<u32>,
    local: LocalOverrides,
    remote: RemoteOverrides,
    session: SessionOverrides,
    notifications: NotificationsOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct LocalOverrides {
    provider: Option<LocalProvider>,
    path: Option<PathBuf>,
    size_ceiling_bytes: Option<u64>,
    index_key: Option<String>,
    record_key_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct RemoteOverrides {
    base_url: Option<Box<str>>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct SessionOverrides {
    identity: Option<Box<str>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct NotificationsOverrides {
    success_duration_ms: Option<u64>,
    error_duration_ms: Option<u64>,
}

fn set_if_some<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn apply_overrides(config: &mut StoreConfig, overrides: StoreConfigOverrides) {
    set_if_some(&mut config.version, overrides.version);

    let local = overrides.local;
    set_if_some(&mut config.local.provider, local.provider);
    set_if_some(&mut config.local.path, local.path);
    set_if_some(&mut config.local.size_ceiling_bytes, local.size_ceiling_bytes);
    set_if_some(&mut config.local.index_key, local.index_key);
    set_if_some(&mut config.local.record_key_prefix, local.record_key_prefix);

    if let Some(base_url) = overrides.remote.base_url {
        config.remote.base_url = Some(base_url);
    }
    set_if_some(&mut config.remote.timeout_ms, overrides.remote.timeout_ms);

    if let Some(identity) = overrides.session.identity {
        config.session.identity = Some(identity);
    }

    let notifications = overrides.notifications;
    set_if_some(
        &mut config.notifications.success_duration_ms,
        notifications.success_duration_ms,
    );
    set_if_some(
        &mut config.notifications.error_duration_ms,
        notifications.error_duration_ms,
    );
}
