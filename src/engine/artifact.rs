//! Engine-produced artifacts

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};

/// A file produced by a backup engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    path: PathBuf,
    /// Engine-owned scratch files are removed once placed
    scratch: bool,
}

impl ArtifactHandle {
    /// An artifact the caller does not own
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scratch: false,
        }
    }

    /// An artifact written to engine scratch space
    pub fn scratch(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scratch: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_scratch(&self) -> bool {
        self.scratch
    }

    /// Size of the artifact, or `None` if it is not a regular file
    pub fn size(&self) -> Option<u64> {
        fs::metadata(&self.path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }

    /// Present and non-empty
    pub fn is_usable(&self) -> bool {
        self.size().is_some_and(|len| len > 0)
    }

    /// Remove the artifact if it is engine scratch
    pub fn discard(&self) -> VaultResult<()> {
        if !self.is_scratch() {
            return Ok(());
        }

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(format!(
                "Failed to remove artifact {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_usable_requires_content() {
        let temp_dir = TempDir::new().unwrap();
        let full = temp_dir.path().join("full.bin");
        let empty = temp_dir.path().join("empty.bin");
        fs::write(&full, b"archive").unwrap();
        fs::write(&empty, b"").unwrap();

        assert!(ArtifactHandle::new(&full).is_usable());
        assert!(!ArtifactHandle::new(&empty).is_usable());
        assert!(!ArtifactHandle::new(temp_dir.path().join("missing")).is_usable());
        assert!(!ArtifactHandle::new(temp_dir.path()).is_usable());
    }

    #[test]
    fn test_discard_only_removes_scratch() {
        let temp_dir = TempDir::new().unwrap();
        let owned = temp_dir.path().join("owned.bin");
        let scratch = temp_dir.path().join("scratch.bin");
        fs::write(&owned, b"keep").unwrap();
        fs::write(&scratch, b"drop").unwrap();

        ArtifactHandle::new(&owned).discard().unwrap();
        ArtifactHandle::scratch(&scratch).discard().unwrap();
        ArtifactHandle::scratch(&scratch).discard().unwrap();

        assert!(owned.exists());
        assert!(!scratch.exists());
    }
}
