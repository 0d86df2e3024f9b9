use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use vaultkeeper::audit::AuditLogger;
use vaultkeeper::cli::{
    handle_backup_command, handle_resource_command, handle_restore_command, BackupCommands,
    ResourceCommands, RestoreCommands,
};
use vaultkeeper::config::{Settings, VaultPaths};
use vaultkeeper::storage::Storage;

#[derive(Parser)]
#[command(
    name = "vaultkeeper",
    version,
    about = "Backup lifecycle orchestrator",
    long_about = "vaultkeeper creates resource backups through a backup engine, \
                  keeps a catalog of every attempt in step with the archive store, \
                  and stages completed archives for restore."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resource registry commands
    #[command(subcommand)]
    Resource(ResourceCommands),

    /// Backup commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Restore staging commands
    #[command(subcommand)]
    Restore(RestoreCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    vaultkeeper::logging::init()?;

    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    debug!(base_dir = %paths.base_dir().display(), "paths resolved");

    let storage = Storage::open(paths.clone(), &settings)?;
    let audit = AuditLogger::new(paths.audit_log());

    match cli.command {
        Some(Commands::Resource(cmd)) => {
            handle_resource_command(&storage, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            if !handle_backup_command(&storage, &settings, &audit, cmd)? {
                std::process::exit(1);
            }
        }
        Some(Commands::Restore(cmd)) => {
            handle_restore_command(&storage, &settings, &audit, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = audit.read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in &entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing vaultkeeper at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            storage.archives.ensure_root()?;
            storage.resources.save()?;
            println!("Initialization complete!");
            println!();
            println!("Register a resource with: vaultkeeper resource add <id> <name> <short> --source <dir>");
        }
        Some(Commands::Config) => {
            println!("vaultkeeper Configuration");
            println!("=========================");
            println!("Data directory:    {}", paths.base_dir().display());
            println!("Catalog:           {}", paths.catalog_file().display());
            println!("Archive root:      {}", settings.archive_root(&paths).display());
            println!("Staging root:      {}", settings.staging_root(&paths).display());
            println!("Audit log:         {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Directory mode:    {:o}", settings.dir_permissions);
            println!("  Archive extension: {}", settings.archive_extension);
            println!("  Requester:         {}", settings.requester);
            println!("  Restore context:   {}", settings.restore_context);
        }
        None => {
            println!("vaultkeeper - backup lifecycle orchestrator");
            println!();
            println!("Run 'vaultkeeper --help' for usage information.");
        }
    }

    Ok(())
}
