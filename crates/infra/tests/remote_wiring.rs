//! Composition tests: a configured base URL and identity route through HTTP.
#![allow(missing_docs)]

use profile_store_config::{LocalProvider, StoreConfig, StoreEnv};
use profile_store_domain::ConfigDraft;
use profile_store_infra::{InfraError, InfraResult, StoreObservers, build_config_store};
use profile_store_shared::RequestContext;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(server: &MockServer) -> InfraResult<profile_store_config::ValidatedStoreConfig> {
    let mut config = StoreConfig::default();
    config.local.provider = LocalProvider::Memory;
    config.remote.base_url = Some(format!("{}/api/", server.uri()).into());
    config.session.identity = Some("ana@example.com".into());
    config.validate_and_normalize().map_err(InfraError::from)
}

fn token_env() -> InfraResult<StoreEnv> {
    let map = BTreeMap::from([(
        "PSTORE_REMOTE_API_TOKEN".to_string(),
        "tok-1".to_string(),
    )]);
    StoreEnv::from_map(&map).map_err(InfraError::from)
}

#[tokio::test]
async fn signed_in_list_uses_the_configured_remote() -> InfraResult<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/configs"))
        .and(header("x-profile-identity", "ana@example.com"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "b", "name": "beta" },
            { "id": "a", "name": "Alpha" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let built = build_config_store(
        &remote_config(&server)?,
        &token_env()?,
        Path::new("/unused"),
        StoreObservers::default(),
    )?;
    let entries = built
        .store
        .get_config_list(&RequestContext::new_request())
        .await
        .map_err(InfraError::from)?;

    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta"]);
    Ok(())
}

#[tokio::test]
async fn signing_out_switches_the_same_store_to_local() -> InfraResult<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/configs"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let built = build_config_store(
        &remote_config(&server)?,
        &token_env()?,
        Path::new("/unused"),
        StoreObservers::default(),
    )?;
    built.session.sign_out();

    let ctx = RequestContext::new_request();
    let saved = built
        .store
        .save_config(&ctx, ConfigDraft::named("Offline"))
        .await
        .map_err(InfraError::from)?;
    assert_eq!(saved.route.label(), "local");
    assert_eq!(
        built
            .store
            .get_config_list(&ctx)
            .await
            .map_err(InfraError::from)?
            .len(),
        1
    );
    Ok(())
}
