//! Local restore staging area

use std::path::PathBuf;

use crate::error::{VaultError, VaultResult};
use crate::storage::archive_store::create_dir_with_mode;

use super::StagingArea;

/// A local directory the restore subsystem reads staged archives from
#[derive(Debug, Clone)]
pub struct LocalStagingArea {
    root: PathBuf,
    dir_mode: u32,
}

impl LocalStagingArea {
    pub fn new(root: PathBuf, dir_mode: u32) -> Self {
        Self { root, dir_mode }
    }
}

impl StagingArea for LocalStagingArea {
    fn ensure_ready(&self) -> VaultResult<PathBuf> {
        create_dir_with_mode(&self.root, self.dir_mode).map_err(|e| {
            VaultError::StagingUnavailable(format!(
                "Cannot create staging directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        if !self.root.is_dir() {
            return Err(VaultError::StagingUnavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        Ok(self.root.clone())
    }
}
