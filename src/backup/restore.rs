//! Restore staging
//!
//! Copies a completed archive into the staging area under a name no other
//! restore can be using, and returns a [`StagingHandle`] the caller passes on
//! to the restore subsystem. Driving the restore itself happens elsewhere.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditEvent, AuditLogger};
use crate::engine::StagingArea;
use crate::error::{VaultError, VaultResult};
use crate::models::{BackupId, ResourceId};
use crate::storage::{copy_file_atomic, ArchiveStore, BackupCatalog};

/// Characters left bare in handoff query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Everything the restore subsystem needs to pick up a staged archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingHandle {
    pub context_id: String,
    pub staged_file_name: String,
    pub staged_path: PathBuf,
    pub backup_id: BackupId,
    pub resource_id: ResourceId,
}

impl StagingHandle {
    /// Render the handoff as a query against `base`, e.g. a restore URL
    pub fn handoff_uri(&self, base: &str) -> String {
        let separator = if base.contains('?') { '&' } else { '?' };
        format!(
            "{}{}contextid={}&filename={}",
            base,
            separator,
            utf8_percent_encode(&self.context_id, QUERY_VALUE),
            utf8_percent_encode(&self.staged_file_name, QUERY_VALUE)
        )
    }
}

/// Prepares catalogued archives for restore
pub struct RestoreStager<'a> {
    catalog: &'a BackupCatalog,
    archives: &'a ArchiveStore,
    staging: &'a dyn StagingArea,
    audit: Option<&'a AuditLogger>,
    requester: String,
    context_id: String,
}

impl<'a> RestoreStager<'a> {
    pub fn new(
        catalog: &'a BackupCatalog,
        archives: &'a ArchiveStore,
        staging: &'a dyn StagingArea,
    ) -> Self {
        Self {
            catalog,
            archives,
            staging,
            audit: None,
            requester: "admin".to_string(),
            context_id: "system".to_string(),
        }
    }

    /// Identity the restore runs on behalf of
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = requester.into();
        self
    }

    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = context_id.into();
        self
    }

    pub fn with_audit(mut self, audit: &'a AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Stage the archive of a completed backup for restore
    pub fn prepare_restore(&self, backup_id: BackupId) -> VaultResult<StagingHandle> {
        let record = self.catalog.get(backup_id)?;
        if !record.is_complete() {
            return Err(VaultError::InvalidState(format!(
                "Backup {} cannot be restored: status is {}",
                backup_id, record.status
            )));
        }
        let archive_name = record.archive_file_name.clone().unwrap_or_default();

        let staging_root = self.staging.ensure_ready()?;

        let staged_file_name =
            staging_file_name(record.resource_id, &self.requester, &archive_name);

        let source = match self.archives.path_for(&archive_name) {
            Ok(path) if path.is_file() => path,
            _ => return Err(self.missing_archive(record.resource_id, backup_id, &archive_name)),
        };

        let staged_path = staging_root.join(&staged_file_name);
        copy_file_atomic(&source, &staged_path).map_err(|e| {
            VaultError::Storage(format!("Failed to stage {}: {}", archive_name, e))
        })?;

        info!(
            backup_id = %backup_id,
            resource_id = %record.resource_id,
            staged = %staged_file_name,
            "archive staged for restore"
        );
        self.audit(
            AuditEntry::new(AuditEvent::RestoreStaged, record.resource_id, Some(backup_id))
                .with_detail(staged_file_name.clone()),
        );

        Ok(StagingHandle {
            context_id: self.context_id.clone(),
            staged_file_name,
            staged_path,
            backup_id,
            resource_id: record.resource_id,
        })
    }

    /// Remove a staged copy the restore subsystem no longer needs
    ///
    /// Returns whether a file was removed.
    pub fn discard_staged(&self, staged_file_name: &str) -> VaultResult<bool> {
        let invalid = staged_file_name.is_empty()
            || staged_file_name.starts_with('.')
            || staged_file_name.contains(['/', '\\']);
        if invalid {
            return Err(VaultError::Validation(format!(
                "Invalid staged file name: '{}'",
                staged_file_name
            )));
        }

        let root = self.staging.ensure_ready()?;
        match fs::remove_file(root.join(staged_file_name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(VaultError::Io(format!(
                "Failed to remove staged file {}: {}",
                staged_file_name, e
            ))),
        }
    }

    /// Report a complete record with no usable archive behind it
    fn missing_archive(
        &self,
        resource_id: ResourceId,
        backup_id: BackupId,
        archive_name: &str,
    ) -> VaultError {
        let path = self.archives.root().join(archive_name).display().to_string();
        warn!(
            target: "vaultkeeper::integrity",
            backup_id = %backup_id,
            resource_id = %resource_id,
            file = %archive_name,
            "catalog lists a complete backup whose archive is missing"
        );
        self.audit(
            AuditEntry::new(AuditEvent::IntegrityWarning, resource_id, Some(backup_id))
                .with_detail(format!("archive missing: {}", path)),
        );
        VaultError::MissingArchive {
            backup_id: backup_id.value(),
            path,
        }
    }

    fn audit(&self, entry: AuditEntry) {
        if let Some(audit) = self.audit {
            audit.record(entry);
        }
    }
}

/// Staging name unique to one restore of `resource_id` by `requester`
fn staging_file_name(resource_id: ResourceId, requester: &str, archive_name: &str) -> String {
    let extension = Path::new(archive_name)
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "tar".to_string());

    format!(
        "restore-{}-{}-{}.{}",
        resource_id,
        sanitize(requester),
        Uuid::new_v4().simple(),
        extension
    )
}

fn sanitize(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "anon".to_string()
    } else {
        cleaned
    }
}
