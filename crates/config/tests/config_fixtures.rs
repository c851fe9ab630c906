//! Integration tests for parsing config fixtures from the workspace testkit.

use profile_store_config::{
    CURRENT_CONFIG_VERSION, LocalProvider, StoreEnv, load_store_config_from_path,
    parse_store_config_json, parse_store_config_toml,
};
use profile_store_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map_or_else(|| manifest_dir.to_path_buf(), Path::to_path_buf)
        .join("testkit")
        .join("fixtures")
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixtures_dir().join(relative))?)
}

#[test]
fn parses_valid_json_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/store-config.valid.json")?;
    let config = parse_store_config_json(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.local.provider, LocalProvider::Sqlite);
    assert_eq!(config.limits().size_ceiling_bytes.get(), 1_048_576);
    assert_eq!(
        config.remote.base_url.as_deref(),
        Some("https://profiles.example.test/api"),
        "base url should be trimmed and lose its trailing slash"
    );
    assert_eq!(config.limits().remote_timeout_ms.get(), 2_500);
    assert_eq!(config.session.identity, None, "blank identity means signed out");
    assert_eq!(config.notifications.success_duration_ms, 1_500);
    assert_eq!(config.notifications.error_duration_ms, 5_000);
    Ok(())
}

#[test]
fn parses_valid_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/store-config.valid.toml")?;
    let config = parse_store_config_toml(&contents)?;

    assert_eq!(config.local.provider, LocalProvider::Memory);
    assert_eq!(config.local.index_key, "profiles.index");
    assert_eq!(config.local.record_key_prefix, "profiles.record.");
    assert_eq!(config.session.identity.as_deref(), Some("user-42"));
    Ok(())
}

#[test]
fn rejects_out_of_range_ceiling() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/store-config.invalid-limit.json")?;
    let error = parse_store_config_json(&contents).err();
    assert!(matches!(
        error,
        Some(envelope) if envelope.code == ErrorCode::new("config", "invalid_limit")
            && envelope.metadata.get("field").map(String::as_str) == Some("sizeCeilingBytes")
    ));
    Ok(())
}

#[test]
fn rejects_index_key_inside_record_namespace() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/store-config.invalid-keys.json")?;
    let error = parse_store_config_json(&contents).err();
    assert!(matches!(
        error,
        Some(envelope) if envelope.code == ErrorCode::new("config", "invalid_key_layout")
    ));
    Ok(())
}

#[test]
fn loads_toml_fixture_from_path_with_env_on_top() -> Result<(), Box<dyn Error>> {
    let path = fixtures_dir().join("config/store-config.valid.toml");
    let env = StoreEnv {
        local_provider: Some(LocalProvider::File),
        session_identity: Some("user-7".into()),
        ..StoreEnv::default()
    };

    let config = load_store_config_from_path(Some(&path), None, &env)?;
    assert_eq!(config.local.provider, LocalProvider::File);
    assert_eq!(config.local.index_key, "profiles.index");
    assert_eq!(config.session.identity.as_deref(), Some("user-7"));
    Ok(())
}
