//! Error types for vaultkeeper
//!
//! Every fallible operation in the crate returns a [`VaultResult`]. The
//! variants separate expected outcomes (a missing record, a record in the
//! wrong state) from storage and engine failures so callers can react
//! without inspecting message strings.

use thiserror::Error;

/// The main error type for vaultkeeper operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A resource or backup record does not exist
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An operation was attempted against a record in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The catalog or archive store is unreachable or unwritable
    #[error("Storage error: {0}")]
    Storage(String),

    /// The backup engine failed
    #[error("Engine error: {0}")]
    Engine(String),

    /// The catalog says a backup is complete but its archive is gone
    #[error("Archive for backup {backup_id} is missing: {path}")]
    MissingArchive { backup_id: u64, path: String },

    /// The restore staging area could not be prepared
    #[error("Staging unavailable: {0}")]
    StagingUnavailable(String),
}

impl VaultError {
    /// Create a "not found" error for backup records
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for resources
    pub fn resource_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Resource",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an invalid state error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this is a catalog/store inconsistency
    pub fn is_missing_archive(&self) -> bool {
        matches!(self, Self::MissingArchive { .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for vaultkeeper operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = VaultError::backup_not_found("17");
        assert_eq!(err.to_string(), "Backup not found: 17");
        assert!(err.is_not_found());
        assert!(!err.is_invalid_state());
    }

    #[test]
    fn test_missing_archive_error() {
        let err = VaultError::MissingArchive {
            backup_id: 3,
            path: "/srv/archives/x.tar".into(),
        };
        assert_eq!(
            err.to_string(),
            "Archive for backup 3 is missing: /srv/archives/x.tar"
        );
        assert!(err.is_missing_archive());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }
}
