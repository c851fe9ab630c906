//! Environment validation helpers for CLI surfaces.

use profile_store_config::{StoreConfig, StoreEnv, apply_env_overrides};
use profile_store_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Validate that the provided env overrides can be parsed and merged into a config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<()> {
    let parsed = StoreEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    let _ = apply_env_overrides(StoreConfig::default(), &parsed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_store_shared::ErrorCode;

    #[test]
    fn rejects_unknown_provider() {
        let env = BTreeMap::from([("PSTORE_LOCAL_PROVIDER".to_string(), "redis".to_string())]);
        let error = validate_env_parsing(&env).err();
        assert!(matches!(
            error,
            Some(envelope) if envelope.code == ErrorCode::new("config", "invalid_env_enum")
        ));
    }

    #[test]
    fn rejects_out_of_range_ceiling() {
        let env = BTreeMap::from([(
            "PSTORE_LOCAL_SIZE_CEILING_BYTES".to_string(),
            "12".to_string(),
        )]);
        assert!(validate_env_parsing(&env).is_err());
    }
}
