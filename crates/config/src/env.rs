//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: present-but-invalid values fail fast instead of
//! silently falling back. Secret values never appear in error metadata.

use crate::schema::{StoreConfig, ValidatedStoreConfig};
use crate::storage::LocalProvider;
use profile_store_shared::{ErrorCode, ErrorEnvelope, SecretString, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Env var: local key-value provider (`memory`, `file`, `sqlite`).
pub const ENV_LOCAL_PROVIDER: &str = "PSTORE_LOCAL_PROVIDER";
/// Env var: local store directory.
pub const ENV_LOCAL_PATH: &str = "PSTORE_LOCAL_PATH";
/// Env var: local size ceiling in bytes.
pub const ENV_LOCAL_SIZE_CEILING_BYTES: &str = "PSTORE_LOCAL_SIZE_CEILING_BYTES";
/// Env var: remote service base URL.
pub const ENV_REMOTE_BASE_URL: &str = "PSTORE_REMOTE_BASE_URL";
/// Env var: remote request timeout in milliseconds.
pub const ENV_REMOTE_TIMEOUT_MS: &str = "PSTORE_REMOTE_TIMEOUT_MS";
/// Env var: remote bearer token (secret).
pub const ENV_REMOTE_API_TOKEN: &str = "PSTORE_REMOTE_API_TOKEN";
/// Env var: signed-in identity.
pub const ENV_SESSION_IDENTITY: &str = "PSTORE_SESSION_IDENTITY";

/// Typed env-derived overrides for `StoreConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreEnv {
    /// Override for `local.provider`.
    pub local_provider: Option<LocalProvider>,
    /// Override for `local.path`.
    pub local_path: Option<PathBuf>,
    /// Override for `local.sizeCeilingBytes`.
    pub local_size_ceiling_bytes: Option<u64>,
    /// Override for `remote.baseUrl`.
    pub remote_base_url: Option<Box<str>>,
    /// Override for `remote.timeoutMs`.
    pub remote_timeout_ms: Option<u64>,
    /// Remote bearer token. Never part of `StoreConfig`.
    pub remote_api_token: Option<SecretString>,
    /// Override for `session.identity`.
    pub session_identity: Option<Box<str>>,
}

impl StoreEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        let local_provider = parse_optional_trimmed(map, ENV_LOCAL_PROVIDER)?
            .map(|raw| {
                raw.parse::<LocalProvider>()
                    .map_err(|()| EnvParseError::InvalidEnum {
                        var: ENV_LOCAL_PROVIDER,
                        value: raw.into_string(),
                    })
            })
            .transpose()?;

        Ok(Self {
            local_provider,
            local_path: parse_optional_trimmed(map, ENV_LOCAL_PATH)?
                .map(|raw| PathBuf::from(raw.as_ref())),
            local_size_ceiling_bytes: parse_optional_u64(map, ENV_LOCAL_SIZE_CEILING_BYTES)?,
            remote_base_url: parse_optional_url(map, ENV_REMOTE_BASE_URL)?,
            remote_timeout_ms: parse_optional_u64(map, ENV_REMOTE_TIMEOUT_MS)?,
            remote_api_token: parse_optional_secret(map, ENV_REMOTE_API_TOKEN)?,
            session_identity: parse_optional_trimmed(map, ENV_SESSION_IDENTITY)?,
        })
    }

    /// Parse env overrides from the process environment (`PSTORE_*` only).
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("PSTORE_"))
            .collect();
        Self::from_map(&map)
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: StoreConfig,
    env: &StoreEnv,
) -> Result<ValidatedStoreConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(provider) = env.local_provider {
        config.local.provider = provider;
    }
    if let Some(path) = env.local_path.as_ref() {
        config.local.path.clone_from(path);
    }
    if let Some(ceiling) = env.local_size_ceiling_bytes {
        config.local.size_ceiling_bytes = ceiling;
    }
    if let Some(base_url) = env.remote_base_url.as_ref() {
        config.remote.base_url = Some(base_url.clone());
    }
    if let Some(timeout_ms) = env.remote_timeout_ms {
        config.remote.timeout_ms = timeout_ms;
    }
    if let Some(identity) = env.session_identity.as_ref() {
        config.session.identity = Some(identity.clone());
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_if_secret(var, &value)),
        }
    }
}

fn parse_optional_trimmed(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.into()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    Ok(parse_optional_trimmed(map, var)?.map(SecretString::new))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_url(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed(map, var)? else {
        return Ok(None);
    };

    let valid = Url::parse(&trimmed)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
    if valid {
        Ok(Some(trimmed))
    } else {
        Err(EnvParseError::InvalidUrl {
            var,
            value: trimmed.into_string(),
        })
    }
}
