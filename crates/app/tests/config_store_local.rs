//! Integration tests for the configuration store on the local backend.

mod common;

use common::{INDEX_KEY, RECORD_PREFIX, config_id, harness, harness_with};
use profile_store_app::{BackendRoute, ConfigStoreSettings, StoreError};
use profile_store_domain::{
    AssistantConfig, Capabilities, ConfigDraft, ConfigName, DraftAttachment, KnowledgeFile,
};
use profile_store_ports::Severity;
use profile_store_shared::{ErrorEnvelope, RequestContext, Result};
use profile_store_testkit::KvOp;

fn draft(name: &str) -> ConfigDraft {
    ConfigDraft::named(name)
}

#[tokio::test]
async fn save_trims_name_and_load_returns_defaults() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();

    let outcome = h.store.save_config(&ctx, draft(" Helper ")).await?;
    assert_eq!(outcome.metadata.name.as_str(), "Helper");
    assert_eq!(outcome.metadata.id.as_str(), "cfg-1");
    assert_eq!(outcome.route, BackendRoute::Local);

    let loaded = h.store.load_config(&ctx, &outcome.metadata.id).await?;
    assert_eq!(
        loaded,
        AssistantConfig {
            id: outcome.metadata.id.clone(),
            name: ConfigName::parse("Helper").map_err(ErrorEnvelope::from)?,
            description: String::new(),
            instructions: String::new(),
            capabilities: Capabilities::default(),
            knowledge_files: Vec::new(),
        }
    );
    assert_eq!(h.take_severities(), vec![Severity::Success]);
    Ok(())
}

#[tokio::test]
async fn oversized_record_is_rejected_without_writes() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Small")).await?;
    let before = h.raw.snapshot();
    h.notifier.take();

    let big = ConfigDraft {
        instructions: Some("x".repeat(5_000_000)),
        ..draft("Huge")
    };
    let error = h.store.save_config(&ctx, big).await.err();
    assert!(matches!(
        error,
        Some(StoreError::SizeLimitExceeded { size_bytes, ceiling_bytes: 4_718_592 })
            if size_bytes > 5_000_000
    ));
    assert_eq!(h.raw.snapshot(), before);
    assert_eq!(h.take_severities(), vec![Severity::Error]);

    let names: Vec<String> = h
        .store
        .get_config_list(&ctx)
        .await?
        .into_iter()
        .map(|entry| entry.name.to_string())
        .collect();
    assert_eq!(names, vec!["Small".to_string()]);
    Ok(())
}

#[tokio::test]
async fn size_is_measured_in_bytes_not_characters() -> Result<()> {
    let h = harness_with(ConfigStoreSettings {
        size_ceiling_bytes: 1_024,
        ..ConfigStoreSettings::default()
    });
    let ctx = RequestContext::new_request();

    // 400 chars, 1200 bytes.
    let multibyte = ConfigDraft {
        description: Some("語".repeat(400)),
        ..draft("Wide")
    };
    let error = h.store.save_config(&ctx, multibyte).await.err();
    assert!(matches!(error, Some(StoreError::SizeLimitExceeded { .. })));
    assert!(h.raw.snapshot().is_empty());
    Ok(())
}

#[tokio::test]
async fn list_is_sorted_by_name_regardless_of_save_order() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Writer")).await?;
    h.store.save_config(&ctx, draft("artist")).await?;
    h.store.save_config(&ctx, draft("Mentor")).await?;

    let names: Vec<String> = h
        .store
        .get_config_list(&ctx)
        .await?
        .into_iter()
        .map(|entry| entry.name.to_string())
        .collect();
    assert_eq!(names, vec!["artist", "Mentor", "Writer"]);
    assert_eq!(h.index_entries().len(), 3);
    Ok(())
}

#[tokio::test]
async fn missing_record_is_not_found_with_one_notification() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();

    let error = h
        .store
        .load_config(&ctx, &config_id("nonexistent")?)
        .await
        .err();
    assert!(matches!(error, Some(StoreError::NotFound { id }) if id.as_str() == "nonexistent"));
    assert_eq!(h.take_severities(), vec![Severity::Warning]);
    Ok(())
}

#[tokio::test]
async fn delete_removes_record_and_index_entry_and_is_idempotent() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let saved = h.store.save_config(&ctx, draft("Temp")).await?;
    let id = saved.metadata.id;

    h.store.delete_config(&ctx, &id).await?;
    h.store.delete_config(&ctx, &id).await?;

    assert!(matches!(
        h.store.load_config(&ctx, &id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(h.store.get_config_list(&ctx).await?.is_empty());
    assert!(h.record_ids().is_empty());
    Ok(())
}

#[tokio::test]
async fn load_returns_what_was_saved_minus_transient_state() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let candidate = ConfigDraft {
        description: Some("Summarizes papers".to_string()),
        instructions: Some("Cite sources.".to_string()),
        capabilities: Capabilities {
            web_search: true,
            image_generation: false,
        },
        knowledge_files: vec![
            DraftAttachment {
                name: "notes.md".to_string(),
                media_type: "text/markdown".to_string(),
                content: "# Notes".to_string(),
                error: None,
            },
            DraftAttachment {
                name: "scan.pdf".to_string(),
                error: Some("unsupported type".to_string()),
                ..DraftAttachment::default()
            },
        ],
        ..draft("  Research  ")
    };

    let saved = h.store.save_config(&ctx, candidate).await?;
    let loaded = h.store.load_config(&ctx, &saved.metadata.id).await?;
    assert_eq!(loaded.name.as_str(), "Research");
    assert_eq!(loaded.description, "Summarizes papers");
    assert_eq!(loaded.instructions, "Cite sources.");
    assert!(loaded.capabilities.web_search);
    assert_eq!(
        loaded.knowledge_files,
        vec![KnowledgeFile {
            name: "notes.md".to_string(),
            media_type: "text/markdown".to_string(),
            content: "# Notes".to_string(),
        }]
    );
    Ok(())
}

#[tokio::test]
async fn update_replaces_record_and_index_entry() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let saved = h.store.save_config(&ctx, draft("First")).await?;

    let update = ConfigDraft {
        id: Some(saved.metadata.id.to_string()),
        description: Some("renamed".to_string()),
        ..draft("Second")
    };
    let updated = h.store.save_config(&ctx, update).await?;
    assert_eq!(updated.metadata.id, saved.metadata.id);

    let entries = h.index_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.first().map(|entry| entry.name.as_str()), Some("Second"));
    assert_eq!(entries.first().map(|entry| entry.description.as_str()), Some("renamed"));
    Ok(())
}

#[tokio::test]
async fn blank_name_is_a_validation_error_without_writes() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();

    let error = h.store.save_config(&ctx, draft("   ")).await.err();
    assert!(matches!(error, Some(StoreError::Validation(_))));
    assert!(h.raw.snapshot().is_empty());
    assert_eq!(h.take_severities(), vec![Severity::Warning]);
    Ok(())
}

#[tokio::test]
async fn failed_index_write_rolls_back_a_create() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Kept")).await?;
    h.notifier.take();
    let before = h.raw.snapshot();

    h.faults.fail_on(KvOp::Put, INDEX_KEY);
    let error = h.store.save_config(&ctx, draft("Lost")).await.err();
    assert!(matches!(error, Some(StoreError::Backend { partial: false, .. })));

    assert_eq!(h.raw.snapshot(), before);
    assert!(h.logger.has_event("configStore.save.rollback"));
    assert_eq!(h.take_severities(), vec![Severity::Error]);
    Ok(())
}

#[tokio::test]
async fn failed_index_write_restores_the_previous_record_on_update() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let saved = h.store.save_config(&ctx, draft("Original")).await?;

    h.faults.fail_on(KvOp::Put, INDEX_KEY);
    let update = ConfigDraft {
        id: Some(saved.metadata.id.to_string()),
        ..draft("Replacement")
    };
    assert!(h.store.save_config(&ctx, update).await.is_err());
    h.faults.clear_faults();

    let loaded = h.store.load_config(&ctx, &saved.metadata.id).await?;
    assert_eq!(loaded.name.as_str(), "Original");
    Ok(())
}

#[tokio::test]
async fn record_is_written_before_the_index() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Ordered")).await?;

    assert_eq!(
        h.faults.journal(),
        vec![
            "put assistant_configs.record.cfg-1".to_string(),
            format!("put {INDEX_KEY}"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn failed_index_rewrite_on_delete_is_partial() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let saved = h.store.save_config(&ctx, draft("Stale")).await?;
    h.notifier.take();

    h.faults.fail_on(KvOp::Put, INDEX_KEY);
    let error = h.store.delete_config(&ctx, &saved.metadata.id).await.err();
    assert!(matches!(error, Some(StoreError::Backend { partial: true, .. })));
    assert!(h.record_ids().is_empty());
    assert_eq!(h.index_entries().len(), 1);
    assert!(h.logger.has_event("configStore.delete.indexStale"));
    assert_eq!(h.take_severities(), vec![Severity::Error]);

    let envelope = error.map(ErrorEnvelope::from);
    let meta = envelope.as_ref().map(|envelope| &envelope.metadata);
    assert_eq!(meta.and_then(|m| m.get("indexStale")).map(String::as_str), Some("true"));
    assert!(meta.is_some_and(|m| !m.contains_key("orphanedRecord")));
    Ok(())
}

#[tokio::test]
async fn failed_rollback_reports_an_orphaned_record_not_a_stale_index() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();

    h.faults.fail_on(KvOp::Put, INDEX_KEY);
    h.faults.fail_on(KvOp::Delete, RECORD_PREFIX);
    let error = h.store.save_config(&ctx, draft("X")).await.err();
    assert!(matches!(error, Some(StoreError::Backend { partial: true, .. })));
    assert!(h.logger.has_event("configStore.save.rollbackFailed"));
    assert_eq!(h.record_ids().len(), 1);
    assert!(h.index_entries().is_empty());

    let envelope = error.map(ErrorEnvelope::from);
    let meta = envelope.as_ref().map(|envelope| &envelope.metadata);
    assert_eq!(meta.and_then(|m| m.get("partial")).map(String::as_str), Some("true"));
    assert_eq!(meta.and_then(|m| m.get("rollback")).map(String::as_str), Some("failed"));
    assert_eq!(
        meta.and_then(|m| m.get("orphanedRecord")).map(String::as_str),
        Some("true")
    );
    assert!(meta.is_some_and(|m| !m.contains_key("indexStale")));
    Ok(())
}

#[tokio::test]
async fn update_replaces_an_unreadable_record() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    let saved = h.store.save_config(&ctx, draft("A")).await?;
    h.notifier.take();
    h.raw
        .insert_raw(&format!("{RECORD_PREFIX}{}", saved.metadata.id), "{broken");

    let update = ConfigDraft {
        id: Some(saved.metadata.id.to_string()),
        ..draft("A2")
    };
    let updated = h.store.save_config(&ctx, update).await?;
    assert_eq!(updated.metadata.id, saved.metadata.id);
    assert!(h.logger.has_event("configStore.save.previousUnreadable"));
    assert_eq!(h.take_severities(), vec![Severity::Success]);

    let loaded = h.store.load_config(&ctx, &saved.metadata.id).await?;
    assert_eq!(loaded.name.as_str(), "A2");
    let names: Vec<String> = h
        .index_entries()
        .into_iter()
        .map(|entry| entry.name.to_string())
        .collect();
    assert_eq!(names, vec!["A2".to_string()]);
    Ok(())
}

#[tokio::test]
async fn corrupt_index_lists_as_empty_without_notification() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.raw.insert_raw(INDEX_KEY, "{not json");

    assert!(h.store.get_config_list(&ctx).await?.is_empty());
    assert!(h.logger.has_event("configStore.list.indexCorrupt"));
    assert!(h.take_severities().is_empty());

    let error = h.store.save_config(&ctx, draft("Blocked")).await.err();
    assert!(matches!(error, Some(StoreError::Backend { partial: false, .. })));
    assert!(h.record_ids().is_empty());
    Ok(())
}

#[tokio::test]
async fn unreadable_index_is_reported_once_and_lists_empty() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Hidden")).await?;
    h.notifier.take();

    h.faults.fail_on(KvOp::Get, INDEX_KEY);
    assert!(h.store.get_config_list(&ctx).await?.is_empty());
    assert_eq!(h.take_severities(), vec![Severity::Error]);
    Ok(())
}

#[tokio::test]
async fn cancelled_request_writes_nothing_and_does_not_notify() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    ctx.cancel();

    let error = h.store.save_config(&ctx, draft("Never")).await.err();
    assert!(matches!(&error, Some(error) if error.is_cancelled()));
    assert!(error.map(ErrorEnvelope::from).is_some_and(|envelope| envelope.is_cancelled()));
    assert!(h.raw.snapshot().is_empty());
    assert!(h.take_severities().is_empty());
    assert!(h.logger.has_event("configStore.save.aborted"));
    Ok(())
}

#[tokio::test]
async fn operations_log_start_and_completion() -> Result<()> {
    let h = harness();
    let ctx = RequestContext::new_request();
    h.store.save_config(&ctx, draft("Logged")).await?;

    assert_eq!(
        h.logger.event_names(),
        vec!["configStore.save.start", "configStore.save.completed"]
    );
    Ok(())
}
