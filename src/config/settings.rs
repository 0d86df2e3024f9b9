//! User settings for vaultkeeper
//!
//! Archive and staging locations, directory permissions, archive naming,
//! and the identity backups and restores run on behalf of.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::VaultError;

/// User settings for vaultkeeper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base location for completed archives (defaults to `<base>/archives`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_root: Option<PathBuf>,

    /// Base location for restore staging (defaults to `<base>/staging`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_root: Option<PathBuf>,

    /// Creation mode for new directories (Unix only)
    #[serde(default = "default_dir_permissions")]
    pub dir_permissions: u32,

    /// Extension given to archive files
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    /// Identity the engine and restore subsystem run on behalf of
    #[serde(default = "default_requester")]
    pub requester: String,

    /// Context identifier handed to the restore subsystem
    #[serde(default = "default_restore_context")]
    pub restore_context: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_dir_permissions() -> u32 {
    0o700
}

fn default_archive_extension() -> String {
    "tar".to_string()
}

fn default_requester() -> String {
    "admin".to_string()
}

fn default_restore_context() -> String {
    "system".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            archive_root: None,
            staging_root: None,
            dir_permissions: default_dir_permissions(),
            archive_extension: default_archive_extension(),
            requester: default_requester(),
            restore_context: default_restore_context(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| VaultError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| VaultError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would produce unusable archive names or modes
    pub fn validate(&self) -> Result<(), VaultError> {
        let ext = self.archive_extension.trim();
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            return Err(VaultError::Config(format!(
                "Invalid archive extension: '{}'",
                self.archive_extension
            )));
        }

        if self.dir_permissions > 0o7777 {
            return Err(VaultError::Config(format!(
                "Invalid directory permissions: {:o}",
                self.dir_permissions
            )));
        }

        if self.requester.trim().is_empty() {
            return Err(VaultError::Config("Requester cannot be empty".into()));
        }

        Ok(())
    }

    /// Resolved location for completed archives
    pub fn archive_root(&self, paths: &VaultPaths) -> PathBuf {
        self.archive_root
            .clone()
            .unwrap_or_else(|| paths.archive_dir())
    }

    /// Resolved location for restore staging
    pub fn staging_root(&self, paths: &VaultPaths) -> PathBuf {
        self.staging_root
            .clone()
            .unwrap_or_else(|| paths.staging_dir())
    }
}
