//! Contract-style tests for port traits using the in-memory doubles.

#![allow(missing_docs)]

use profile_store_domain::{ConfigDraft, ConfigId, Identity};
use profile_store_ports::{
    IdGeneratorPort, KeyValueStorePort, LogFields, LoggerPort, Notification, NotifierPort,
    RemoteConfigPort, SessionPort, Severity,
};
use profile_store_shared::{ErrorEnvelope, RequestContext, Result};
use profile_store_testkit::in_memory::{
    InMemoryKeyValueStore, InMemoryRemote, NoopLogger, RecordingNotifier, SequentialIds,
    ToggleSession,
};
use profile_store_testkit::fixtures::seed_records;
use std::sync::Arc;

fn identity(raw: &str) -> Result<Identity> {
    Identity::parse(raw).map_err(ErrorEnvelope::from)
}

#[tokio::test]
async fn key_value_port_contract_smoke() -> Result<()> {
    let ctx = RequestContext::new_request();
    let port: Arc<dyn KeyValueStorePort> = Arc::new(InMemoryKeyValueStore::new());

    assert_eq!(port.get(&ctx, "missing".into()).await?, None);
    port.put(&ctx, "cfg.a".into(), "{}".into()).await?;
    port.put(&ctx, "cfg.b".into(), "{}".into()).await?;
    port.put(&ctx, "index".into(), "[]".into()).await?;
    port.put(&ctx, "cfg.a".into(), "{\"v\":2}".into()).await?;

    assert_eq!(
        port.get(&ctx, "cfg.a".into()).await?.as_deref(),
        Some("{\"v\":2}")
    );
    let mut keys = port.list_keys(&ctx, "cfg.".into()).await?;
    keys.sort();
    assert_eq!(keys, vec![Box::<str>::from("cfg.a"), Box::from("cfg.b")]);

    port.delete(&ctx, "cfg.a".into()).await?;
    port.delete(&ctx, "cfg.a".into()).await?;
    assert_eq!(port.get(&ctx, "cfg.a".into()).await?, None);
    Ok(())
}

#[tokio::test]
async fn key_value_port_honors_cancellation() {
    let ctx = RequestContext::new_request();
    ctx.cancel();
    let port: Arc<dyn KeyValueStorePort> = Arc::new(InMemoryKeyValueStore::new());

    let error = port.put(&ctx, "cfg.a".into(), "{}".into()).await;
    assert!(error.is_err_and(|error| error.is_cancelled()));
}

#[tokio::test]
async fn remote_port_contract_smoke() -> Result<()> {
    let ctx = RequestContext::new_request();
    let remote = InMemoryRemote::new();
    let port: Arc<dyn RemoteConfigPort> = Arc::new(remote.clone());
    let alice = identity("alice")?;

    let candidate = ConfigDraft::named("Helper")
        .normalize()
        .map_err(ErrorEnvelope::from)?;
    let saved = port.save(&ctx, alice.clone(), candidate).await?;
    let loaded = port.load(&ctx, alice.clone(), saved.id.clone()).await?;
    assert_eq!(loaded.map(|record| record.metadata()), Some(saved.clone()));

    let unknown = ConfigId::parse("nope").map_err(ErrorEnvelope::from)?;
    assert_eq!(port.load(&ctx, alice.clone(), unknown.clone()).await?, None);
    assert!(!port.delete(&ctx, alice.clone(), unknown).await?);
    assert!(port.delete(&ctx, alice.clone(), saved.id).await?);
    assert!(port.list(&ctx, alice).await?.is_empty());
    assert_eq!(remote.calls().len(), 6);
    Ok(())
}

#[tokio::test]
async fn remote_rejects_updates_of_unknown_records() -> Result<()> {
    let ctx = RequestContext::new_request();
    let port: Arc<dyn RemoteConfigPort> = Arc::new(InMemoryRemote::new());

    let mut draft = ConfigDraft::named("Helper");
    draft.id = Some("cfg-404".to_string());
    let candidate = draft.normalize().map_err(ErrorEnvelope::from)?;
    let error = port.save(&ctx, identity("alice")?, candidate).await;
    assert!(error.is_err_and(|error| error.code.to_string() == "remote:rejected"));
    Ok(())
}

#[tokio::test]
async fn seeded_remote_lists_one_entry_per_record() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::new_request();
    let remote = InMemoryRemote::new();
    let owner = identity("owner@example.com")?;
    for record in seed_records()? {
        remote.seed(&owner, record);
    }

    let listed = remote.list(&ctx, owner.clone()).await?;
    assert_eq!(listed.len(), remote.records_for(&owner).len());
    assert!(!listed.is_empty());
    Ok(())
}

#[test]
fn observer_ports_are_object_safe() -> Result<()> {
    let logger: Arc<dyn LoggerPort> = Arc::new(NoopLogger);
    logger.child(LogFields::new()).info("x", "y", None);

    let notifier = RecordingNotifier::new();
    let port: Arc<dyn NotifierPort> = Arc::new(notifier.clone());
    port.notify(Notification {
        message: "Saved".into(),
        severity: Severity::Success,
        duration_hint_ms: 2_000,
    });
    assert_eq!(notifier.notifications().len(), 1);

    let session: Arc<dyn SessionPort> = Arc::new(ToggleSession::signed_in("alice"));
    assert_eq!(session.current_identity(), Some(identity("alice")?));

    let ids: Arc<dyn IdGeneratorPort> = Arc::new(SequentialIds::new("t"));
    assert_ne!(ids.next_id()?, ids.next_id()?);
    Ok(())
}
