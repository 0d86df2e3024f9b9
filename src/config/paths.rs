//! Path management for vaultkeeper
//!
//! Resolves where the catalog, resource registry, settings, audit log,
//! archives and restore staging live.
//!
//! ## Path Resolution Order
//!
//! 1. `VAULTKEEPER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/vaultkeeper` or `~/.config/vaultkeeper`
//! 3. Windows: `%APPDATA%\vaultkeeper`

use std::path::PathBuf;

use crate::error::VaultError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "VAULTKEEPER_DATA_DIR";

/// Manages all paths used by vaultkeeper
#[derive(Debug, Clone)]
pub struct VaultPaths {
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Default directory for completed archives
    pub fn archive_dir(&self) -> PathBuf {
        self.base_dir.join("archives")
    }

    /// Default directory for restore staging
    pub fn staging_dir(&self) -> PathBuf {
        self.base_dir.join("staging")
    }

    /// Scratch space handed to engines that produce artifacts on disk
    pub fn scratch_dir(&self) -> PathBuf {
        self.base_dir.join("scratch")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// The backup catalog document
    pub fn catalog_file(&self) -> PathBuf {
        self.base_dir.join("catalog.json")
    }

    /// The resource registry document
    pub fn resources_file(&self) -> PathBuf {
        self.base_dir.join("resources.json")
    }

    /// Ensure the base directory exists
    ///
    /// Archive and staging roots are created lazily by the components that
    /// own them, with their configured permissions.
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }

    /// Check if vaultkeeper has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                VaultError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("vaultkeeper"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| VaultError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("vaultkeeper"))
}
