//! Catalog and archive store cross-check

use std::collections::HashSet;

use tracing::warn;

use crate::audit::{AuditEntry, AuditEvent, AuditLogger};
use crate::error::VaultResult;
use crate::models::BackupRecord;
use crate::storage::{ArchiveStore, BackupCatalog};

/// What a verification pass found
#[derive(Debug, Default)]
pub struct IntegrityReport {
    /// Complete records checked
    pub checked: usize,
    /// Complete records whose archive file is gone
    pub missing: Vec<BackupRecord>,
    /// Archive files no record references
    pub unreferenced: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every complete record against the archive store
///
/// Each missing archive is logged as an integrity warning and, when an audit
/// logger is given, recorded in the audit trail. Nothing is modified.
pub fn verify_catalog(
    catalog: &BackupCatalog,
    archives: &ArchiveStore,
    audit: Option<&AuditLogger>,
) -> VaultResult<IntegrityReport> {
    let mut report = IntegrityReport::default();
    let mut referenced = HashSet::new();

    for record in catalog.list()? {
        let Some(file_name) = record.archive_file_name.clone() else {
            continue;
        };
        referenced.insert(file_name.clone());
        if !record.is_complete() {
            continue;
        }

        report.checked += 1;
        if archives.exists(&file_name) {
            continue;
        }

        warn!(
            target: "vaultkeeper::integrity",
            backup_id = %record.id,
            resource_id = %record.resource_id,
            file = %file_name,
            "complete backup has no archive"
        );
        if let Some(audit) = audit {
            audit.record(
                AuditEntry::new(AuditEvent::IntegrityWarning, record.resource_id, Some(record.id))
                    .with_detail(format!("archive missing: {}", file_name)),
            );
        }
        report.missing.push(record);
    }

    if archives.root().is_dir() {
        report.unreferenced = archives
            .list_archives()?
            .into_iter()
            .filter(|name| !referenced.contains(name))
            .collect();
    }

    Ok(report)
}
