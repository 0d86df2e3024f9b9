//! Resource CLI commands

use clap::Subcommand;
use std::path::PathBuf;

use crate::error::{VaultError, VaultResult};
use crate::models::{Resource, ResourceId};
use crate::storage::Storage;

/// Resource subcommands
#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Register a resource (or update an existing one)
    Add {
        /// Resource ID
        id: ResourceId,
        /// Human-readable name
        display_name: String,
        /// Short name
        short_name: String,
        /// Directory whose contents are archived
        #[arg(short, long)]
        source: PathBuf,
    },
    /// List registered resources
    List,
    /// Remove a resource from the registry (its backups are kept)
    Remove {
        /// Resource ID
        id: ResourceId,
    },
}

/// Handle a resource command
pub fn handle_resource_command(storage: &Storage, cmd: ResourceCommands) -> VaultResult<()> {
    match cmd {
        ResourceCommands::Add {
            id,
            display_name,
            short_name,
            source,
        } => {
            if !source.is_dir() {
                return Err(VaultError::Validation(format!(
                    "Source directory does not exist: {}",
                    source.display()
                )));
            }
            let source = source.canonicalize()?;

            let resource = Resource::new(id, display_name, short_name).with_source_dir(&source);
            storage.resources.upsert(resource.clone())?;
            storage.resources.save()?;

            println!("Registered resource: {}", resource.display_name);
            println!("  ID:     {}", resource.id);
            println!("  Short:  {}", resource.short_name);
            println!("  Source: {}", source.display());
        }

        ResourceCommands::List => {
            let resources = storage.resources.get_all()?;
            if resources.is_empty() {
                println!("No resources registered.");
                println!("Add one with: vaultkeeper resource add <id> <name> <short> --source <dir>");
                return Ok(());
            }

            for resource in &resources {
                let source = resource
                    .source_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:>6}  {:<12} {:<30} {}",
                    resource.id, resource.short_name, resource.display_name, source
                );
            }
            println!();
            println!("Total: {} resource(s)", resources.len());
        }

        ResourceCommands::Remove { id } => {
            if storage.resources.delete(id)? {
                storage.resources.save()?;
                println!("Removed resource {}", id);
            } else {
                return Err(VaultError::resource_not_found(id.to_string()));
            }
        }
    }

    Ok(())
}
