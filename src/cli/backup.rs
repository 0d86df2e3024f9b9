//! Backup CLI commands
//!
//! Implements CLI commands for creating, inspecting and verifying backups.

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::backup::{verify_catalog, BackupOrchestrator, BackupOutcome};
use crate::config::Settings;
use crate::engine::TarEngine;
use crate::error::VaultResult;
use crate::models::{BackupId, BackupRecord, ResourceId};
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Back up one or more resources
    Create {
        /// Resource IDs
        #[arg(required = true)]
        resources: Vec<ResourceId>,
    },

    /// List catalogued backups
    List {
        /// Only show backups of this resource
        #[arg(short, long)]
        resource: Option<ResourceId>,
    },

    /// Show one backup record
    Show {
        /// Backup ID
        backup: BackupId,
    },

    /// Check that every complete backup still has its archive
    Verify,
}

/// Handle a backup command
///
/// Returns `false` when a requested backup or a verification failed.
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    audit: &AuditLogger,
    cmd: BackupCommands,
) -> VaultResult<bool> {
    match cmd {
        BackupCommands::Create { resources } => {
            let engine = TarEngine::new(&storage.resources, storage.paths().scratch_dir());
            let orchestrator = BackupOrchestrator::new(
                &storage.catalog,
                &storage.archives,
                &storage.resources,
                &engine,
            )
            .with_requester(settings.requester.clone())
            .with_archive_extension(settings.archive_extension.clone())
            .with_audit(audit);

            let outcomes = orchestrator.create_backups(&resources);
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();

            for outcome in &outcomes {
                match outcome {
                    BackupOutcome::Completed(record) => {
                        println!(
                            "Backup {} of resource {} complete: {}",
                            record.id,
                            record.resource_id,
                            record.archive_file_name.as_deref().unwrap_or_default()
                        );
                    }
                    BackupOutcome::Failed {
                        resource_id,
                        backup_id,
                        error,
                    } => {
                        let id = backup_id
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        eprintln!(
                            "Backup {} of resource {} failed: {}",
                            id, resource_id, error
                        );
                    }
                }
            }

            println!();
            println!(
                "{} succeeded, {} failed",
                outcomes.len() - failed,
                failed
            );
            Ok(failed == 0)
        }

        BackupCommands::List { resource } => {
            let records = match resource {
                Some(id) => storage.catalog.list_for_resource(id)?,
                None => storage.catalog.list()?,
            };

            if records.is_empty() {
                println!("No backups found.");
                println!("Create one with: vaultkeeper backup create <resource_id>");
                return Ok(true);
            }

            println!("Backups");
            println!("=======");
            println!();
            for record in &records {
                println!("  {}", format_record_line(record));
            }
            println!();
            println!("Total: {} backup(s)", records.len());
            if let Some(id) = resource {
                match storage.catalog.latest_complete(id)? {
                    Some(latest) => println!(
                        "Latest complete: #{} ({})",
                        latest.id,
                        latest.archive_file_name.as_deref().unwrap_or_default()
                    ),
                    None => println!("No complete backup of resource {}", id),
                }
            }
            Ok(true)
        }

        BackupCommands::Show { backup } => {
            let record = storage.catalog.get(backup)?;
            print!("{}", format_record_details(storage, &record));
            Ok(true)
        }

        BackupCommands::Verify => {
            let report = verify_catalog(&storage.catalog, &storage.archives, Some(audit))?;

            println!("Checked {} complete backup(s)", report.checked);
            if report.missing.is_empty() {
                println!("All archives present.");
            } else {
                println!();
                println!("Missing archives:");
                for record in &report.missing {
                    println!(
                        "  #{} resource {}: {}",
                        record.id,
                        record.resource_id,
                        record.archive_file_name.as_deref().unwrap_or_default()
                    );
                }
            }
            if !report.unreferenced.is_empty() {
                println!();
                println!("Archives not referenced by the catalog:");
                for name in &report.unreferenced {
                    println!("  {}", name);
                }
            }

            Ok(report.is_clean())
        }
    }
}

fn format_record_line(record: &BackupRecord) -> String {
    let when = record
        .created_at
        .unwrap_or(record.attempted_at)
        .format("%Y-%m-%d %H:%M:%S");
    format!(
        "{:>5}  {:<8} {:<12} {}  {}",
        record.id.value(),
        record.status.to_string(),
        record.short_name,
        when,
        record.archive_file_name.as_deref().unwrap_or("-")
    )
}

fn format_record_details(storage: &Storage, record: &BackupRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Backup #{}\n", record.id));
    out.push_str(&format!("  Status:    {}\n", record.status));
    out.push_str(&format!(
        "  Resource:  {} ({}, {})\n",
        record.display_name, record.short_name, record.resource_id
    ));
    out.push_str(&format!(
        "  Attempted: {}\n",
        record.attempted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(created) = record.created_at {
        out.push_str(&format!(
            "  Created:   {}\n",
            created.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(name) = &record.archive_file_name {
        let size = match storage.archives.size_of(name) {
            Ok(bytes) => format_size(bytes),
            Err(_) => "MISSING".to_string(),
        };
        out.push_str(&format!("  Archive:   {} ({})\n", name, size));
    }
    if let Some(reason) = &record.failure_reason {
        out.push_str(&format!("  Reason:    {}\n", reason));
    }

    out
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_record_line_pending() {
        let record = BackupRecord::pending(BackupId::new(4), ResourceId::new(9), "Geo", "GEO");
        let line = format_record_line(&record);
        assert!(line.contains("PENDING"));
        assert!(line.contains("GEO"));
        assert!(line.ends_with('-'));
    }
}
