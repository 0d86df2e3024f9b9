//! vaultkeeper - backup lifecycle orchestrator
//!
//! Creates backups of resources through a pluggable backup engine, keeps a
//! catalog of every attempt consistent with the archives actually on disk,
//! and stages completed archives for a restore subsystem.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Backup records, resources and typed ids
//! - `storage`: Backup catalog, resource registry and archive store
//! - `engine`: Collaborator traits and the tar engine
//! - `backup`: Backup orchestration, restore staging and verification
//! - `audit`: Audit logging system
//! - `logging`: Diagnostic log subscriber
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultkeeper::config::{Settings, VaultPaths};
//! use vaultkeeper::storage::Storage;
//!
//! let paths = VaultPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths, &settings)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;

pub use error::VaultError;
