//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and restore layer.

pub mod backup;
pub mod resource;
pub mod restore;

pub use backup::{handle_backup_command, BackupCommands};
pub use resource::{handle_resource_command, ResourceCommands};
pub use restore::{handle_restore_command, RestoreCommands};
