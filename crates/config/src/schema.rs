//! Store configuration schema, defaults, validation, and normalization.
//!
//! Deserialization is strict (`deny_unknown_fields`) and every section is
//! default-filled, so an empty file is a valid config. Validation is manual
//! and returns typed errors mapped to `ErrorEnvelope`.

use crate::storage::LocalProvider;
use profile_store_shared::{BoundedU64, ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default local size ceiling: 4.5 MiB.
pub const DEFAULT_SIZE_CEILING_BYTES: u64 = 4_718_592;

const SIZE_CEILING_MIN_BYTES: u64 = 1_024;
const SIZE_CEILING_MAX_BYTES: u64 = 1_073_741_824;
const REMOTE_TIMEOUT_MIN_MS: u64 = 100;
const REMOTE_TIMEOUT_MAX_MS: u64 = 600_000;
const NOTIFICATION_DURATION_MAX_MS: u64 = 60_000;

const DEFAULT_INDEX_KEY: &str = "assistant_configs.index";
const DEFAULT_RECORD_KEY_PREFIX: &str = "assistant_configs.record.";
const DEFAULT_LOCAL_PATH: &str = ".profile-store";

/// Strips credentials from a URL before it lands in error metadata.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Top-level store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StoreConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Local backend settings.
    pub local: LocalConfig,
    /// Remote backend settings.
    pub remote: RemoteConfig,
    /// Session oracle settings.
    pub session: SessionConfig,
    /// Notification display hints.
    pub notifications: NotificationsConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            local: LocalConfig::default(),
            remote: RemoteConfig::default(),
            session: SessionConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

/// Local backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LocalConfig {
    /// Key-value engine.
    pub provider: LocalProvider,
    /// Directory holding the store (relative to the working directory).
    pub path: PathBuf,
    /// Maximum serialized size of one record.
    pub size_ceiling_bytes: u64,
    /// Key of the metadata index.
    pub index_key: String,
    /// Prefix of per-record keys.
    pub record_key_prefix: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            provider: LocalProvider::default(),
            path: PathBuf::from(DEFAULT_LOCAL_PATH),
            size_ceiling_bytes: DEFAULT_SIZE_CEILING_BYTES,
            index_key: DEFAULT_INDEX_KEY.to_owned(),
            record_key_prefix: DEFAULT_RECORD_KEY_PREFIX.to_owned(),
        }
    }
}

impl LocalConfig {
    fn normalize(&mut self) {
        self.index_key = self.index_key.trim().to_owned();
        self.record_key_prefix = self.record_key_prefix.trim().to_owned();
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.index_key.is_empty() {
            return Err(ConfigSchemaError::InvalidKeyLayout {
                reason: "indexKey must be non-empty",
            });
        }
        if self.record_key_prefix.is_empty() {
            return Err(ConfigSchemaError::InvalidKeyLayout {
                reason: "recordKeyPrefix must be non-empty",
            });
        }
        if self.index_key.starts_with(&self.record_key_prefix) {
            return Err(ConfigSchemaError::InvalidKeyLayout {
                reason: "indexKey must not start with recordKeyPrefix",
            });
        }
        if self.provider != LocalProvider::Memory && self.path.as_os_str().is_empty() {
            return Err(ConfigSchemaError::EmptyField {
                section: "local",
                field: "path",
            });
        }
        Ok(())
    }
}

/// Remote backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RemoteConfig {
    /// Service base URL; `None` leaves the remote backend unconfigured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Box<str>>,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 10_000,
        }
    }
}

impl RemoteConfig {
    fn normalize(&mut self) {
        self.base_url = self
            .base_url
            .take()
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .map(String::into_boxed_str);
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        let Some(base_url) = self.base_url.as_deref() else {
            return Ok(());
        };
        let valid = Url::parse(base_url)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
        if valid {
            Ok(())
        } else {
            Err(ConfigSchemaError::InvalidUrl {
                section: "remote",
                field: "baseUrl",
                url: base_url.to_owned(),
            })
        }
    }
}

/// Session oracle configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SessionConfig {
    /// Identity presented at start-up; absent means signed out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Box<str>>,
}

impl SessionConfig {
    fn normalize(&mut self) {
        self.identity = self
            .identity
            .take()
            .map(|identity| identity.trim().to_owned())
            .filter(|identity| !identity.is_empty())
            .map(String::into_boxed_str);
    }
}

/// Notification display hints forwarded to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct NotificationsConfig {
    /// Display time for success confirmations.
    pub success_duration_ms: u64,
    /// Display time for failures.
    pub error_duration_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            success_duration_ms: 2_000,
            error_duration_ms: 5_000,
        }
    }
}

impl NotificationsConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        for (field, value) in [
            ("successDurationMs", self.success_duration_ms),
            ("errorDurationMs", self.error_duration_ms),
        ] {
            if value > NOTIFICATION_DURATION_MAX_MS {
                return Err(ConfigSchemaError::LimitOutOfRange {
                    section: "notifications",
                    field,
                    value,
                    min: 0,
                    max: NOTIFICATION_DURATION_MAX_MS,
                });
            }
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedStoreConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        self.local.normalize();
        self.local.validate()?;
        self.remote.normalize();
        self.remote.validate()?;
        self.session.normalize();
        self.notifications.validate()?;

        let limits = ConfigLimits::new(&self)?;
        Ok(ValidatedStoreConfig { raw: self, limits })
    }
}

/// Validated config wrapper carrying bounded numeric values.
#[derive(Debug, Clone)]
pub struct ValidatedStoreConfig {
    raw: StoreConfig,
    limits: ConfigLimits,
}

impl ValidatedStoreConfig {
    /// Access validated numeric bounds.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> StoreConfig {
        self.raw
    }
}

impl AsRef<StoreConfig> for ValidatedStoreConfig {
    fn as_ref(&self) -> &StoreConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedStoreConfig {
    type Target = StoreConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Validated numeric limits derived from the config.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLimits {
    /// Local record size ceiling (bytes).
    pub size_ceiling_bytes: BoundedU64<SIZE_CEILING_MIN_BYTES, SIZE_CEILING_MAX_BYTES>,
    /// Remote request timeout (ms).
    pub remote_timeout_ms: BoundedU64<REMOTE_TIMEOUT_MIN_MS, REMOTE_TIMEOUT_MAX_MS>,
}

impl ConfigLimits {
    fn new(config: &StoreConfig) -> Result<Self, ConfigSchemaError> {
        let size_ceiling_bytes = BoundedU64::try_new(config.local.size_ceiling_bytes)
            .map_err(|error| ConfigSchemaError::LimitOutOfRange {
                section: "local",
                field: "sizeCeilingBytes",
                value: error.value,
                min: error.min,
                max: error.max,
            })?;
        let remote_timeout_ms = BoundedU64::try_new(config.remote.timeout_ms).map_err(|error| {
            ConfigSchemaError::TimeoutOutOfRange {
                section: "remote",
                field: "timeoutMs",
                value_ms: error.value,
                min_ms: error.min,
                max_ms: error.max,
            }
        })?;
        Ok(Self {
            size_ceiling_bytes,
            remote_timeout_ms,
        })
    }
}

/// Parse a store config from a JSON string, applying validation and normalization.
pub fn parse_store_config_json(input: &str) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let config: StoreConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a store config from a TOML string, applying validation and normalization.
pub fn parse_store_config_toml(input: &str) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let config: StoreConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Schema validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A timeout value is out of bounds.
    TimeoutOutOfRange {
        /// Schema section (e.g. `remote`).
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `local`).
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A required field is empty.
    EmptyField {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A URL entry is invalid.
    InvalidUrl {
        /// Schema section (e.g. `remote`).
        section: &'static str,
        /// Field name in the config file (e.g. `baseUrl`).
        field: &'static str,
        /// Invalid URL value.
        url: String,
    },
    /// Index and record keys would collide.
    InvalidKeyLayout {
        /// Human readable reason.
        reason: &'static str,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::EmptyField { .. } => ErrorCode::new("config", "empty_field"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
            Self::InvalidKeyLayout { .. } => ErrorCode::new("config", "invalid_key_layout"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
            Self::EmptyField { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::InvalidUrl { section, field, .. } => {
                write!(formatter, "invalid URL for {section}.{field}")
            },
            Self::InvalidKeyLayout { reason } => write!(formatter, "invalid key layout: {reason}"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string())
                .with_metadata("min_ms", min_ms.to_string())
                .with_metadata("max_ms", max_ms.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::EmptyField { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
            ConfigSchemaError::InvalidUrl {
                section,
                field,
                url,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("url", sanitize_url_for_error(&url)),
            ConfigSchemaError::InvalidKeyLayout { reason } => {
                envelope.with_metadata("reason", reason)
            },
        }
    }
}
