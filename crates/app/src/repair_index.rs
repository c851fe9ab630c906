//! Restore index/record consistency on the local backend.
//!
//! Repair is explicit; listing never heals the index on its own.

use profile_store_domain::{ConfigId, ConfigMetadata, sort_metadata, upsert_metadata};
use profile_store_ports::{LocalConfigBackendPort, LogFields, LoggerPort};
use profile_store_shared::{RequestContext, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Dependencies required by index repair.
#[derive(Clone)]
pub struct RepairIndexDeps {
    /// Local record/index backend.
    pub local: Arc<dyn LocalConfigBackendPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// What a repair pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Index entries removed because their record was missing.
    pub dropped: Vec<ConfigId>,
    /// Records without an index entry that were added back.
    pub adopted: Vec<ConfigId>,
    /// Unreadable records without an index entry that were deleted.
    pub discarded: Vec<ConfigId>,
    /// Whether the index was written.
    pub index_rewritten: bool,
}

impl RepairReport {
    /// Whether the pass changed anything on disk.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.index_rewritten || !self.discarded.is_empty()
    }
}

/// Rebuild the local index from the stored records.
///
/// - entries whose record is missing are dropped
/// - records missing from the index are adopted from their stored projection
/// - unreadable records missing from the index are deleted
/// - duplicate entries collapse to one and the result is sorted by name
pub async fn repair_local_index(
    ctx: &RequestContext,
    deps: &RepairIndexDeps,
) -> Result<RepairReport> {
    ctx.ensure_not_cancelled("repair_local_index")?;

    let index = deps.local.get_index(ctx).await?;
    let stored: BTreeSet<ConfigId> = deps
        .local
        .list_record_ids(ctx)
        .await?
        .into_iter()
        .collect();

    let mut report = RepairReport::default();
    let mut kept: Vec<ConfigMetadata> = Vec::with_capacity(index.entries.len());
    for entry in index.entries.iter().cloned() {
        if stored.contains(&entry.id) {
            upsert_metadata(&mut kept, entry);
        } else if !report.dropped.contains(&entry.id) {
            report.dropped.push(entry.id);
        }
    }

    let indexed: BTreeSet<ConfigId> = kept.iter().map(|entry| entry.id.clone()).collect();
    for id in stored.difference(&indexed) {
        match deps.local.get_record(ctx, id.clone()).await {
            Ok(Some(record)) => {
                upsert_metadata(&mut kept, record.metadata());
                report.adopted.push(id.clone());
            },
            Ok(None) => {},
            Err(error) => {
                if let Some(logger) = deps.logger.as_ref() {
                    logger.error("configStore.repair.unreadableRecord", &error, None);
                }
                deps.local.delete_record(ctx, id.clone()).await?;
                report.discarded.push(id.clone());
            },
        }
    }

    sort_metadata(&mut kept);
    if index.corrupt || kept != index.entries {
        deps.local.put_index(ctx, kept).await?;
        report.index_rewritten = true;
    }

    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "configStore.repair.summary",
            "Local index repair finished",
            Some(log_fields_report(&report)),
        );
    }
    Ok(report)
}

fn log_fields_report(report: &RepairReport) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("dropped".into(), Value::from(report.dropped.len()));
    fields.insert("adopted".into(), Value::from(report.adopted.len()));
    fields.insert("discarded".into(), Value::from(report.discarded.len()));
    fields.insert("indexRewritten".into(), Value::from(report.index_rewritten));
    fields
}
