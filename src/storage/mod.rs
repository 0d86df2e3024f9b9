//! Storage layer for vaultkeeper
//!
//! JSON documents written atomically (catalog, resource registry) and the
//! archive directory itself.

pub mod archive_store;
pub mod catalog;
pub mod file_io;
pub mod resources;

pub use archive_store::{archive_file_name, ArchiveStore};
pub use catalog::BackupCatalog;
pub use file_io::{copy_file_atomic, read_json, write_json_atomic};
pub use resources::ResourceRegistry;

use crate::config::{Settings, VaultPaths};
use crate::error::VaultResult;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: VaultPaths,
    pub catalog: BackupCatalog,
    pub resources: ResourceRegistry,
    pub archives: ArchiveStore,
}

impl Storage {
    /// Open storage rooted at `paths`, loading the catalog and registry
    pub fn open(paths: VaultPaths, settings: &Settings) -> VaultResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            catalog: BackupCatalog::open(paths.catalog_file())?,
            resources: ResourceRegistry::open(paths.resources_file())?,
            archives: ArchiveStore::new(settings.archive_root(&paths), settings.dir_permissions),
            paths,
        })
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }
}
