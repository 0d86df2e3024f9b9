//! Backup record model
//!
//! One record per backup attempt. A record is created `Pending`, and moves
//! exactly once to `Complete` or `Failed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BackupId, ResourceId};

/// Lifecycle status of a backup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Pending,
    Complete,
    Failed,
}

impl BackupStatus {
    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A catalogued backup attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: BackupId,

    pub resource_id: ResourceId,

    /// Resource display name at the time of the backup
    pub display_name: String,

    /// Resource short name at the time of the backup
    pub short_name: String,

    /// Set once the archive has been placed and verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_file_name: Option<String>,

    /// Set once, at successful completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    pub status: BackupStatus,

    /// When the attempt was registered
    pub attempted_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl BackupRecord {
    /// Create a pending record for a new attempt
    pub fn pending(
        id: BackupId,
        resource_id: ResourceId,
        display_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            resource_id,
            display_name: display_name.into(),
            short_name: short_name.into(),
            archive_file_name: None,
            created_at: None,
            status: BackupStatus::Pending,
            attempted_at: Utc::now(),
            failure_reason: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == BackupStatus::Complete
    }

    pub fn is_pending(&self) -> bool {
        self.status == BackupStatus::Pending
    }

    /// Archive name and creation time are present iff the record is complete
    pub fn is_consistent(&self) -> bool {
        let finalized = self.archive_file_name.is_some() && self.created_at.is_some();
        let untouched = self.archive_file_name.is_none() && self.created_at.is_none();
        if self.is_complete() {
            finalized
        } else {
            untouched
        }
    }
}

impl fmt::Display for BackupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}) [{}]",
            self.id, self.short_name, self.resource_id, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_record() {
        let record = BackupRecord::pending(
            BackupId::new(1),
            ResourceId::new(42),
            "Algebra 101",
            "ALG101",
        );
        assert!(record.is_pending());
        assert!(record.is_consistent());
        assert!(record.archive_file_name.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_consistency_rules() {
        let mut record =
            BackupRecord::pending(BackupId::new(1), ResourceId::new(2), "Name", "N");

        record.status = BackupStatus::Complete;
        assert!(!record.is_consistent());

        record.archive_file_name = Some("a.tar".into());
        record.created_at = Some(Utc::now());
        assert!(record.is_consistent());

        record.status = BackupStatus::Failed;
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BackupStatus::Complete).unwrap();
        assert_eq!(json, "\"complete\"");
        assert!(BackupStatus::Failed.is_terminal());
        assert!(!BackupStatus::Pending.is_terminal());
    }
}
