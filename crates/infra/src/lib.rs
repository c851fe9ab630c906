//! # profile-store-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Store command helpers used by the CLI.
pub mod cli_store;
/// Adapter selection and store construction.
pub mod composition;
/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Logger selection.
pub mod observability;

pub use cli_store::{
    ListOutput, StoreCommandOptions, run_delete, run_list, run_repair, run_save, run_show,
    save_request_schema_json,
};
pub use composition::{BuiltStore, StoreObservers, build_config_store, build_key_value_store};
pub use config_check::load_effective_config_json;
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use observability::{LOG_LEVEL_ENV, LogFormat, build_logger, parse_log_level, scope_logger};

// Re-export redaction utilities for CLI boundary sanitization
pub use profile_store_shared::{is_secret_key, redact_if_secret};
