//! Backup catalog
//!
//! Durable record of every backup attempt, persisted to `catalog.json`.
//!
//! Every operation holds an advisory lock on `catalog.json.lock` while it
//! reloads the document, and mutations keep the lock exclusively until the
//! change is on disk. Several processes (or several handles in one process)
//! can therefore share one catalog: ids are never handed out twice and a
//! record leaves `Pending` exactly once.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::error::{VaultError, VaultResult};
use crate::models::{BackupId, BackupRecord, BackupStatus, ResourceId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable catalog document
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct CatalogData {
    next_id: u64,
    records: Vec<BackupRecord>,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogState {
    next_id: u64,
    records: BTreeMap<BackupId, BackupRecord>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

impl CatalogState {
    fn from_data(data: CatalogData) -> Self {
        let mut highest = 0;
        let mut records = BTreeMap::new();
        for record in data.records {
            highest = highest.max(record.id.value());
            records.insert(record.id, record);
        }
        // Never hand out an id already present in the file
        Self {
            next_id: data.next_id.max(highest + 1),
            records,
        }
    }

    fn to_data(&self) -> CatalogData {
        CatalogData {
            next_id: self.next_id,
            records: self.records.values().cloned().collect(),
        }
    }

    fn record_mut(&mut self, id: BackupId) -> VaultResult<&mut BackupRecord> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| VaultError::backup_not_found(id.to_string()))
    }
}

/// Repository for backup records
pub struct BackupCatalog {
    path: PathBuf,
    lock_path: PathBuf,
    /// Last state read from disk; serializes callers within this process
    state: RwLock<CatalogState>,
}

impl BackupCatalog {
    /// Create a catalog handle without touching the disk
    pub fn new(path: PathBuf) -> Self {
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        Self {
            lock_path: path.with_file_name(lock_name),
            path,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Create a catalog and load it from disk
    pub fn open(path: PathBuf) -> VaultResult<Self> {
        let catalog = Self::new(path);
        catalog.load()?;
        Ok(catalog)
    }

    /// Reload records from disk
    pub fn load(&self) -> VaultResult<()> {
        self.snapshot().map(|_| ())
    }

    /// Create a pending record for a new attempt
    pub fn register_pending(
        &self,
        resource_id: ResourceId,
        display_name: &str,
        short_name: &str,
    ) -> VaultResult<BackupId> {
        self.transact(|state| {
            let id = BackupId::new(state.next_id);
            state.next_id += 1;
            state
                .records
                .insert(id, BackupRecord::pending(id, resource_id, display_name, short_name));
            Ok(id)
        })
    }

    /// Move a pending record to `Complete`
    pub fn finalize(
        &self,
        id: BackupId,
        archive_file_name: &str,
        created_at: DateTime<Utc>,
    ) -> VaultResult<BackupRecord> {
        self.transact(|state| {
            let record = state.record_mut(id)?;

            if record.status.is_terminal() {
                return Err(VaultError::InvalidState(format!(
                    "Backup {} cannot be finalized: status is {}",
                    id, record.status
                )));
            }

            record.status = BackupStatus::Complete;
            record.archive_file_name = Some(archive_file_name.to_string());
            record.created_at = Some(created_at);
            Ok(record.clone())
        })
    }

    /// Mark a record as failed
    ///
    /// Marking an already failed record again is a no-op.
    pub fn mark_failed(&self, id: BackupId) -> VaultResult<()> {
        self.mark_failed_with(id, None)
    }

    /// Mark a record as failed and remember why
    pub fn mark_failed_with(&self, id: BackupId, reason: Option<String>) -> VaultResult<()> {
        self.transact(|state| {
            let record = state.record_mut(id)?;

            match record.status {
                BackupStatus::Failed => Ok(()),
                BackupStatus::Complete => Err(VaultError::InvalidState(format!(
                    "Backup {} is complete and cannot be marked failed",
                    id
                ))),
                BackupStatus::Pending => {
                    record.status = BackupStatus::Failed;
                    record.failure_reason = reason;
                    Ok(())
                }
            }
        })
    }

    /// Remove a record that never completed
    ///
    /// Unknown ids are ignored so the call can be retried safely.
    pub fn discard_pending(&self, id: BackupId) -> VaultResult<()> {
        self.transact(|state| {
            let Some(record) = state.records.get(&id) else {
                return Ok(());
            };

            if record.is_complete() {
                return Err(VaultError::InvalidState(format!(
                    "Backup {} is complete and cannot be discarded",
                    id
                )));
            }

            state.records.remove(&id);
            Ok(())
        })
    }

    /// Get a record by id
    pub fn get(&self, id: BackupId) -> VaultResult<BackupRecord> {
        self.snapshot()?
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| VaultError::backup_not_found(id.to_string()))
    }

    /// All records, oldest first
    pub fn list(&self) -> VaultResult<Vec<BackupRecord>> {
        Ok(self.snapshot()?.records.into_values().collect())
    }

    /// All records for one resource, oldest first
    pub fn list_for_resource(&self, resource_id: ResourceId) -> VaultResult<Vec<BackupRecord>> {
        Ok(self
            .snapshot()?
            .records
            .into_values()
            .filter(|r| r.resource_id == resource_id)
            .collect())
    }

    /// Most recent complete backup of a resource
    pub fn latest_complete(&self, resource_id: ResourceId) -> VaultResult<Option<BackupRecord>> {
        Ok(self
            .snapshot()?
            .records
            .into_values()
            .rev()
            .find(|r| r.resource_id == resource_id && r.is_complete()))
    }

    pub fn count(&self) -> VaultResult<usize> {
        Ok(self.snapshot()?.records.len())
    }

    /// Reload under the file lock, apply `change`, and persist before unlocking
    ///
    /// On any error the in-memory state is left as it was read from disk.
    fn transact<T>(
        &self,
        change: impl FnOnce(&mut CatalogState) -> VaultResult<T>,
    ) -> VaultResult<T> {
        let mut state = self.write()?;
        let mut file_lock = fd_lock::RwLock::new(self.open_lock_file()?);
        let _guard = file_lock
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to lock catalog: {}", e)))?;

        let current = self.read_state()?;
        let mut next = current.clone();

        match change(&mut next).and_then(|value| {
            write_json_atomic(&self.path, &next.to_data())?;
            Ok(value)
        }) {
            Ok(value) => {
                *state = next;
                Ok(value)
            }
            Err(e) => {
                *state = current;
                Err(e)
            }
        }
    }

    /// Reload under a shared file lock and return a copy of the state
    fn snapshot(&self) -> VaultResult<CatalogState> {
        let mut state = self.write()?;
        let file_lock = fd_lock::RwLock::new(self.open_lock_file()?);
        let _guard = file_lock
            .read()
            .map_err(|e| VaultError::Storage(format!("Failed to lock catalog: {}", e)))?;

        *state = self.read_state()?;
        Ok((*state).clone())
    }

    fn read_state(&self) -> VaultResult<CatalogState> {
        read_json::<CatalogData, _>(&self.path).map(CatalogState::from_data)
    }

    fn open_lock_file(&self) -> VaultResult<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                VaultError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| {
                VaultError::Storage(format!(
                    "Failed to open {}: {}",
                    self.lock_path.display(),
                    e
                ))
            })
    }

    fn write(&self) -> VaultResult<RwLockWriteGuard<'_, CatalogState>> {
        self.state
            .write()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}
