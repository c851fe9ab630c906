//! # profile-store-config
//!
//! Configuration schema, validation, and normalization for the store and
//! the `pstore` CLI. This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Request DTOs and validation.
pub mod requests;
/// JSON Schema exports for request DTOs.
pub mod requests_schema;
/// Configuration schema types and helpers.
pub mod schema;
/// Local key-value provider selection.
pub mod storage;

pub use env::{
    ENV_LOCAL_PATH, ENV_LOCAL_PROVIDER, ENV_LOCAL_SIZE_CEILING_BYTES, ENV_REMOTE_API_TOKEN,
    ENV_REMOTE_BASE_URL, ENV_REMOTE_TIMEOUT_MS, ENV_SESSION_IDENTITY, EnvParseError, StoreEnv,
    apply_env_overrides,
};
pub use load::{
    load_store_config_from_path, load_store_config_from_sources, load_store_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use requests::{
    CapabilitiesDto, KnowledgeFileDto, RequestValidationError, SaveConfigRequestDto, ValidatedSaveConfigRequest,
    parse_config_id, parse_save_config_request_json, validate_save_config_request,
};
pub use requests_schema::save_config_request_schema;
pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigLimits, ConfigSchemaError, DEFAULT_SIZE_CEILING_BYTES,
    LocalConfig, NotificationsConfig, RemoteConfig, SessionConfig, StoreConfig,
    ValidatedStoreConfig, parse_store_config_json, parse_store_config_toml,
};
pub use storage::LocalProvider;
