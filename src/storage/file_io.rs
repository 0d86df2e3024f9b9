//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that never expose a partially written file
//! under its final name.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::VaultError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, VaultError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| VaultError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| VaultError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), VaultError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VaultError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory so the rename is atomic; unique so concurrent writers
    // never share a temp file
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));

    let result = write_temp(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path)
            .map_err(|e| VaultError::Storage(format!("Failed to rename temp file: {}", e)))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_temp<T: Serialize>(temp_path: &Path, data: &T) -> Result<(), VaultError> {
    let file = File::create(temp_path)
        .map_err(|e| VaultError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| VaultError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| VaultError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| VaultError::Storage(format!("Failed to sync data: {}", e)))
}

/// Hidden sibling name used while a copy is in flight
pub fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.partial", name))
}

/// Copy `src` to `dest` without ever exposing a partial `dest`
///
/// The bytes go to a hidden sibling first, are synced, and the copy is
/// checked against the source length before the rename. Returns the number
/// of bytes copied.
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, VaultError> {
    let expected = fs::metadata(src)
        .map_err(|e| VaultError::Io(format!("Failed to stat {}: {}", src.display(), e)))?
        .len();

    let temp_path = partial_path(dest);

    let result = copy_and_verify(src, &temp_path, expected).and_then(|copied| {
        fs::rename(&temp_path, dest).map_err(|e| {
            VaultError::Io(format!("Failed to move copy into {}: {}", dest.display(), e))
        })?;
        Ok(copied)
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn copy_and_verify(src: &Path, temp_path: &Path, expected: u64) -> Result<u64, VaultError> {
    let copied = fs::copy(src, temp_path).map_err(|e| {
        VaultError::Io(format!(
            "Failed to copy {} to {}: {}",
            src.display(),
            temp_path.display(),
            e
        ))
    })?;

    File::open(temp_path)
        .and_then(|f| f.sync_all())
        .map_err(|e| VaultError::Io(format!("Failed to sync {}: {}", temp_path.display(), e)))?;

    let written = fs::metadata(temp_path)
        .map_err(|e| VaultError::Io(format!("Failed to stat {}: {}", temp_path.display(), e)))?
        .len();

    if copied != expected || written != expected {
        return Err(VaultError::Io(format!(
            "Short copy of {}: expected {} bytes, wrote {}",
            src.display(),
            expected,
            written
        )));
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(data, loaded);
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("test.json")]);
    }

    #[test]
    fn test_read_corrupt_json_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        let err = read_json::<TestData, _>(&path).unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
    }

    #[test]
    fn test_copy_file_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.bin");
        let dest = temp_dir.path().join("dest.bin");
        fs::write(&src, vec![7u8; 4096]).unwrap();

        let copied = copy_file_atomic(&src, &dest).unwrap();

        assert_eq!(copied, 4096);
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn test_copy_missing_source_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("missing.bin");
        let dest = temp_dir.path().join("dest.bin");

        assert!(copy_file_atomic(&src, &dest).is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let dest = Path::new("/srv/archives/2025-01-01-ID-1-RESOURCE-2.tar");
        assert_eq!(
            partial_path(dest),
            Path::new("/srv/archives/.2025-01-01-ID-1-RESOURCE-2.tar.partial")
        );
    }
}
