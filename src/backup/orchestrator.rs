//! Backup orchestrator
//!
//! Drives one backup attempt end to end:
//!
//! 1. look up the resource's naming metadata
//! 2. register a pending catalog record
//! 3. make sure the archive root exists
//! 4. fix the archive file name (it embeds the record id)
//! 5. run the engine
//! 6. place the artifact in the archive store
//! 7. check the archive is really there
//! 8. finalize the record
//!
//! Any failure after step 2 marks the record failed. The engine's own report
//! of success is never enough to finalize a record; only an archive observed
//! in the store is.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::audit::{AuditEntry, AuditEvent, AuditLogger};
use crate::engine::{ArtifactHandle, BackupEngine, EngineOutput, ResourceProvider};
use crate::error::{VaultError, VaultResult};
use crate::models::{BackupId, BackupRecord, ResourceId};
use crate::storage::{archive_file_name, ArchiveStore, BackupCatalog};

/// Result of one backup attempt
#[derive(Debug)]
pub enum BackupOutcome {
    /// The archive is placed, verified and catalogued
    Completed(BackupRecord),
    /// The attempt failed; the record (if one was created) is marked failed
    Failed {
        resource_id: ResourceId,
        backup_id: Option<BackupId>,
        error: VaultError,
    },
}

impl BackupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn record(&self) -> Option<&BackupRecord> {
        match self {
            Self::Completed(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&VaultError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn backup_id(&self) -> Option<BackupId> {
        match self {
            Self::Completed(record) => Some(record.id),
            Self::Failed { backup_id, .. } => *backup_id,
        }
    }

    pub fn resource_id(&self) -> ResourceId {
        match self {
            Self::Completed(record) => record.resource_id,
            Self::Failed { resource_id, .. } => *resource_id,
        }
    }
}

/// Runs backup attempts against a catalog, an archive store and an engine
pub struct BackupOrchestrator<'a> {
    catalog: &'a BackupCatalog,
    archives: &'a ArchiveStore,
    resources: &'a dyn ResourceProvider,
    engine: &'a dyn BackupEngine,
    audit: Option<&'a AuditLogger>,
    requester: String,
    archive_extension: String,
}

impl<'a> BackupOrchestrator<'a> {
    pub fn new(
        catalog: &'a BackupCatalog,
        archives: &'a ArchiveStore,
        resources: &'a dyn ResourceProvider,
        engine: &'a dyn BackupEngine,
    ) -> Self {
        Self {
            catalog,
            archives,
            resources,
            engine,
            audit: None,
            requester: "admin".to_string(),
            archive_extension: "tar".to_string(),
        }
    }

    /// Identity the engine runs on behalf of
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = requester.into();
        self
    }

    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    pub fn with_audit(mut self, audit: &'a AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Back up one resource
    ///
    /// Never returns an error: every failure is logged, recorded on the
    /// catalog entry, and reported through [`BackupOutcome::Failed`].
    pub fn create_backup(&self, resource_id: ResourceId) -> BackupOutcome {
        let info = match self.resources.get_resource(resource_id) {
            Ok(info) => info,
            Err(e) => {
                error!(resource_id = %resource_id, error = %e, "backup aborted: resource lookup failed");
                return BackupOutcome::Failed {
                    resource_id,
                    backup_id: None,
                    error: e,
                };
            }
        };

        let registered =
            self.catalog
                .register_pending(resource_id, &info.display_name, &info.short_name);
        let backup_id = match registered {
            Ok(id) => id,
            Err(e) => {
                error!(resource_id = %resource_id, error = %e, "backup aborted: could not register attempt");
                return BackupOutcome::Failed {
                    resource_id,
                    backup_id: None,
                    error: e,
                };
            }
        };

        debug!(backup_id = %backup_id, resource_id = %resource_id, "backup registered");
        self.audit(AuditEntry::new(
            AuditEvent::BackupStarted,
            resource_id,
            Some(backup_id),
        ));

        match self.run_attempt(backup_id, resource_id) {
            Ok(record) => {
                info!(
                    backup_id = %backup_id,
                    resource_id = %resource_id,
                    file = record.archive_file_name.as_deref().unwrap_or_default(),
                    "backup complete"
                );
                self.audit(
                    AuditEntry::new(AuditEvent::BackupCompleted, resource_id, Some(backup_id))
                        .with_detail(record.archive_file_name.clone().unwrap_or_default()),
                );
                BackupOutcome::Completed(record)
            }
            Err(e) => {
                error!(backup_id = %backup_id, resource_id = %resource_id, error = %e, "backup failed");
                if let Err(mark_err) = self.catalog.mark_failed_with(backup_id, Some(e.to_string())) {
                    error!(backup_id = %backup_id, error = %mark_err, "could not mark backup failed");
                }
                self.audit(
                    AuditEntry::new(AuditEvent::BackupFailed, resource_id, Some(backup_id))
                        .with_detail(e.to_string()),
                );
                BackupOutcome::Failed {
                    resource_id,
                    backup_id: Some(backup_id),
                    error: e,
                }
            }
        }
    }

    /// Back up several resources, continuing past failures
    pub fn create_backups(&self, resource_ids: &[ResourceId]) -> Vec<BackupOutcome> {
        resource_ids
            .iter()
            .map(|id| self.create_backup(*id))
            .collect()
    }

    fn run_attempt(&self, backup_id: BackupId, resource_id: ResourceId) -> VaultResult<BackupRecord> {
        self.archives.ensure_root()?;

        let file_name = archive_file_name(
            Utc::now().date_naive(),
            backup_id,
            resource_id,
            &self.archive_extension,
        );

        let artifact = match self.engine.execute(resource_id, &self.requester)? {
            EngineOutput::Produced(artifact) => artifact,
            EngineOutput::Empty => {
                return Err(VaultError::Engine(
                    "engine finished without producing an archive".into(),
                ))
            }
        };

        let placed = self.place(&artifact, &file_name);
        if let Err(e) = artifact.discard() {
            warn!(backup_id = %backup_id, error = %e, "could not remove engine artifact");
        }
        let size = placed?;
        debug!(backup_id = %backup_id, file = %file_name, size, "archive placed");

        let finalized = self.verify_and_finalize(backup_id, &file_name);
        if finalized.is_err() {
            self.remove_orphan(&file_name);
        }
        finalized
    }

    fn place(&self, artifact: &ArtifactHandle, file_name: &str) -> VaultResult<u64> {
        if !artifact.is_usable() {
            return Err(VaultError::Engine(format!(
                "engine artifact {} is missing or empty",
                artifact.path().display()
            )));
        }
        self.archives.place(artifact, file_name)
    }

    fn verify_and_finalize(&self, backup_id: BackupId, file_name: &str) -> VaultResult<BackupRecord> {
        if !self.archives.exists(file_name) {
            return Err(VaultError::Storage(format!(
                "archive {} not present after placement",
                file_name
            )));
        }
        self.catalog.finalize(backup_id, file_name, Utc::now())
    }

    /// Remove an archive whose record could not be finalized
    fn remove_orphan(&self, file_name: &str) {
        let Ok(path) = self.archives.path_for(file_name) else {
            return;
        };
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(file = %file_name, error = %e, "could not remove unfinalized archive");
            }
        }
    }

    fn audit(&self, entry: AuditEntry) {
        if let Some(audit) = self.audit {
            audit.record(entry);
        }
    }
}
