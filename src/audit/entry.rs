//! Audit entry data structures
//!
//! Defines the lifecycle events recorded in the audit log and the entry
//! format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BackupId, ResourceId};

/// Lifecycle events that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    /// A backup attempt was registered
    BackupStarted,
    /// A backup archive was placed, verified and catalogued
    BackupCompleted,
    /// A backup attempt failed
    BackupFailed,
    /// An archive was staged for restore
    RestoreStaged,
    /// The catalog and archive store disagree
    IntegrityWarning,
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEvent::BackupStarted => write!(f, "BACKUP_STARTED"),
            AuditEvent::BackupCompleted => write!(f, "BACKUP_COMPLETED"),
            AuditEvent::BackupFailed => write!(f, "BACKUP_FAILED"),
            AuditEvent::RestoreStaged => write!(f, "RESTORE_STAGED"),
            AuditEvent::IntegrityWarning => write!(f, "INTEGRITY_WARNING"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the event occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub event: AuditEvent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<BackupId>,

    pub resource_id: ResourceId,

    /// Free-form detail (file name, failure reason, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    pub fn new(event: AuditEvent, resource_id: ResourceId, backup_id: Option<BackupId>) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            backup_id,
            resource_id,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Format the entry as a human-readable single line
    pub fn format_human_readable(&self) -> String {
        let mut line = format!(
            "{} {} resource={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event,
            self.resource_id
        );

        if let Some(id) = self.backup_id {
            line.push_str(&format!(" backup={}", id));
        }
        if let Some(detail) = &self.detail {
            line.push_str(&format!(" - {}", detail));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(AuditEvent::BackupCompleted.to_string(), "BACKUP_COMPLETED");
        assert_eq!(AuditEvent::IntegrityWarning.to_string(), "INTEGRITY_WARNING");
    }

    #[test]
    fn test_serialization() {
        let entry = AuditEntry::new(
            AuditEvent::BackupFailed,
            ResourceId::new(42),
            Some(BackupId::new(3)),
        )
        .with_detail("engine produced no archive");

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"backup_failed\""));
        assert!(json.contains("\"backup_id\":3"));

        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event, AuditEvent::BackupFailed);
        assert_eq!(back.detail.as_deref(), Some("engine produced no archive"));
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::new(AuditEvent::BackupStarted, ResourceId::new(42), None);
        let line = entry.format_human_readable();
        assert!(line.contains("BACKUP_STARTED resource=42"));
        assert!(!line.contains("backup="));
    }
}
