//! Core data models for vaultkeeper
//!
//! Backup records, the resources they snapshot, and their typed ids.

pub mod ids;
pub mod record;
pub mod resource;

pub use ids::{BackupId, ResourceId};
pub use record::{BackupRecord, BackupStatus};
pub use resource::{Resource, ResourceInfo};
