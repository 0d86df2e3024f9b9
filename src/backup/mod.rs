//! Backup and restore orchestration
//!
//! # Architecture
//!
//! - `BackupOrchestrator`: runs one backup attempt end to end and keeps the
//!   catalog in step with what is really in the archive store
//! - `RestoreStager`: stages a completed archive for the restore subsystem
//! - `verify_catalog`: finds completed records whose archive has gone missing
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultkeeper::backup::{BackupOrchestrator, RestoreStager};
//!
//! let orchestrator = BackupOrchestrator::new(&catalog, &archives, &resources, &engine);
//! let outcome = orchestrator.create_backup(ResourceId::new(42));
//!
//! if let Some(record) = outcome.record() {
//!     let stager = RestoreStager::new(&catalog, &archives, &staging);
//!     let handle = stager.prepare_restore(record.id)?;
//!     println!("{}", handle.handoff_uri("/backup/restore.php"));
//! }
//! ```

mod orchestrator;
mod restore;
mod verify;

pub use orchestrator::{BackupOrchestrator, BackupOutcome};
pub use restore::{RestoreStager, StagingHandle};
pub use verify::{verify_catalog, IntegrityReport};
