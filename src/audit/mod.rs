//! Audit logging for vaultkeeper
//!
//! Records every backup attempt, its outcome, restore staging, and detected
//! catalog/store inconsistencies in an append-only JSONL file.
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultkeeper::audit::{AuditEntry, AuditEvent, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.record(
//!     AuditEntry::new(AuditEvent::BackupCompleted, resource_id, Some(backup_id))
//!         .with_detail("2025-03-09-ID-17-RESOURCE-42.tar"),
//! );
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, AuditEvent};
pub use logger::AuditLogger;
