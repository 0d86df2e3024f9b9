//! Archive store
//!
//! Owns the directory that holds completed backup archives. Archives are
//! copied in under a hidden partial name and renamed into place only after
//! the copy has been synced and its size checked.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::engine::ArtifactHandle;
use crate::error::{VaultError, VaultResult};
use crate::models::{BackupId, ResourceId};

use super::file_io::copy_file_atomic;

/// Build the canonical archive file name
///
/// `{YYYY-MM-DD}-ID-{backup_id}-RESOURCE-{resource_id}.{ext}`. The backup id
/// keeps names unique even for several backups of one resource on one day.
pub fn archive_file_name(
    date: NaiveDate,
    backup_id: BackupId,
    resource_id: ResourceId,
    extension: &str,
) -> String {
    format!(
        "{}-ID-{}-RESOURCE-{}.{}",
        date.format("%Y-%m-%d"),
        backup_id,
        resource_id,
        extension
    )
}

/// Directory of completed archives
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
    dir_mode: u32,
}

impl ArchiveStore {
    pub fn new(root: PathBuf, dir_mode: u32) -> Self {
        Self { root, dir_mode }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the archive root if needed; safe to call repeatedly
    pub fn ensure_root(&self) -> VaultResult<()> {
        create_dir_with_mode(&self.root, self.dir_mode).map_err(|e| {
            VaultError::Storage(format!(
                "Failed to create archive directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Copy a produced artifact into the store under `file_name`
    ///
    /// Placing the same artifact under the same name again overwrites the
    /// earlier copy, so a retry after a timeout is harmless.
    pub fn place(&self, artifact: &ArtifactHandle, file_name: &str) -> VaultResult<u64> {
        let dest = self.path_for(file_name)?;

        copy_file_atomic(artifact.path(), &dest).map_err(|e| {
            VaultError::Storage(format!("Failed to place archive {}: {}", file_name, e))
        })
    }

    /// Whether a complete archive exists under `file_name`
    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Location of an archive inside the store
    ///
    /// Only plain file names are accepted, so every name maps to a distinct
    /// file directly under the root.
    pub fn path_for(&self, file_name: &str) -> VaultResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// Size in bytes of a stored archive
    pub fn size_of(&self, file_name: &str) -> VaultResult<u64> {
        let path = self.path_for(file_name)?;
        let metadata = fs::metadata(&path).map_err(|e| {
            VaultError::Storage(format!("Failed to stat {}: {}", path.display(), e))
        })?;
        Ok(metadata.len())
    }

    /// Names of all complete archives, sorted
    pub fn list_archives(&self) -> VaultResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            VaultError::Storage(format!("Failed to read archive directory: {}", e))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                VaultError::Storage(format!("Failed to read directory entry: {}", e))
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Hidden names are in-flight partial copies
            if name.starts_with('.') || !entry.path().is_file() {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }
}

fn validate_file_name(file_name: &str) -> VaultResult<()> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\']);

    if invalid {
        return Err(VaultError::Storage(format!(
            "Invalid archive file name: '{}'",
            file_name
        )));
    }

    Ok(())
}

/// Recursively create `dir`, applying `mode` to newly created directories on Unix
pub(crate) fn create_dir_with_mode(dir: &Path, mode: u32) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ArchiveStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(temp_dir.path().join("archives"), 0o700);
        (temp_dir, store)
    }

    fn write_artifact(dir: &Path, bytes: &[u8]) -> ArtifactHandle {
        let path = dir.join("artifact.bin");
        fs::write(&path, bytes).unwrap();
        ArtifactHandle::new(path)
    }

    #[test]
    fn test_archive_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let name = archive_file_name(date, BackupId::new(17), ResourceId::new(42), "mbz");
        assert_eq!(name, "2025-03-09-ID-17-RESOURCE-42.mbz");
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let (temp_dir, store) = create_test_store();

        store.ensure_root().unwrap();
        store.ensure_root().unwrap();

        assert!(store.root().is_dir());
        let dirs: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(dirs.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_root_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, store) = create_test_store();
        store.ensure_root().unwrap();

        let mode = fs::metadata(store.root()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_place_and_exists() {
        let (temp_dir, store) = create_test_store();
        store.ensure_root().unwrap();
        let artifact = write_artifact(temp_dir.path(), &[1u8; 5 * 1024]);

        let size = store.place(&artifact, "a.tar").unwrap();

        assert_eq!(size, 5 * 1024);
        assert!(store.exists("a.tar"));
        assert_eq!(store.size_of("a.tar").unwrap(), 5 * 1024);
        assert_eq!(store.list_archives().unwrap(), vec!["a.tar".to_string()]);
    }

    #[test]
    fn test_place_without_root_fails_cleanly() {
        let (temp_dir, store) = create_test_store();
        let artifact = write_artifact(temp_dir.path(), b"data");

        let err = store.place(&artifact, "a.tar").unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
        assert!(!store.exists("a.tar"));
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let (_temp_dir, store) = create_test_store();

        assert!(store.path_for("../escape.tar").is_err());
        assert!(store.path_for("nested/a.tar").is_err());
        assert!(store.path_for("").is_err());
        assert!(!store.exists("../escape.tar"));
        assert_eq!(store.path_for("a.tar").unwrap(), store.root().join("a.tar"));
    }

    #[test]
    fn test_list_archives_skips_partials() {
        let (_temp_dir, store) = create_test_store();
        store.ensure_root().unwrap();
        fs::write(store.root().join(".b.tar.partial"), b"half").unwrap();
        fs::write(store.root().join("a.tar"), b"whole").unwrap();

        assert_eq!(store.list_archives().unwrap(), vec!["a.tar".to_string()]);
    }
}
