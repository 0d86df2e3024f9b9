//! Restore CLI commands

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::backup::RestoreStager;
use crate::config::Settings;
use crate::engine::LocalStagingArea;
use crate::error::VaultResult;
use crate::models::BackupId;
use crate::storage::Storage;

/// Restore subcommands
#[derive(Subcommand)]
pub enum RestoreCommands {
    /// Stage a backup's archive for restore
    Prepare {
        /// Backup ID
        backup: BackupId,
        /// Print a handoff URI against this base instead of the staged path
        #[arg(short, long)]
        uri: Option<String>,
    },
    /// Remove a staged archive
    Discard {
        /// Staged file name, as printed by `restore prepare`
        staged_file_name: String,
    },
}

/// Handle a restore command
pub fn handle_restore_command(
    storage: &Storage,
    settings: &Settings,
    audit: &AuditLogger,
    cmd: RestoreCommands,
) -> VaultResult<()> {
    let staging = LocalStagingArea::new(
        settings.staging_root(storage.paths()),
        settings.dir_permissions,
    );
    let stager = RestoreStager::new(&storage.catalog, &storage.archives, &staging)
        .with_requester(settings.requester.clone())
        .with_context(settings.restore_context.clone())
        .with_audit(audit);

    match cmd {
        RestoreCommands::Prepare { backup, uri } => {
            let handle = stager.prepare_restore(backup)?;
            match uri {
                Some(base) => println!("{}", handle.handoff_uri(&base)),
                None => {
                    println!("Staged backup {} for restore", handle.backup_id);
                    println!("  Context: {}", handle.context_id);
                    println!("  File:    {}", handle.staged_file_name);
                    println!("  Path:    {}", handle.staged_path.display());
                }
            }
        }

        RestoreCommands::Discard { staged_file_name } => {
            if stager.discard_staged(&staged_file_name)? {
                println!("Removed {}", staged_file_name);
            } else {
                println!("Nothing staged under {}", staged_file_name);
            }
        }
    }

    Ok(())
}
