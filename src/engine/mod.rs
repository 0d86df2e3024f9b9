//! Collaborator interfaces
//!
//! The orchestrator and stager never talk to a concrete platform. They are
//! handed a [`ResourceProvider`] for naming metadata, a [`BackupEngine`] that
//! produces archives, and a [`StagingArea`] where restores pick archives up.
//!
//! - `ArtifactHandle`: an engine-produced file, possibly engine-owned scratch
//! - `TarEngine`: packs a registered resource's source directory into a tar
//! - `LocalStagingArea`: a local directory used as the restore staging area

mod artifact;
mod staging;
mod tar_engine;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact::ArtifactHandle;
pub use staging::LocalStagingArea;
pub use tar_engine::TarEngine;

use std::path::PathBuf;

use crate::error::VaultResult;
use crate::models::{ResourceId, ResourceInfo};

/// Source of resource naming metadata
pub trait ResourceProvider {
    /// Fails with `NotFound` when the resource no longer exists
    fn get_resource(&self, id: ResourceId) -> VaultResult<ResourceInfo>;
}

/// What an engine run produced
#[derive(Debug)]
pub enum EngineOutput {
    /// The engine wrote an artifact
    Produced(ArtifactHandle),
    /// The engine finished without producing anything
    Empty,
}

/// The native backup engine
pub trait BackupEngine {
    /// Run one backup of `resource_id` on behalf of `requester`
    ///
    /// An `Err` means the engine itself failed; `Ok(EngineOutput::Empty)`
    /// means it ran but produced nothing.
    fn execute(&self, resource_id: ResourceId, requester: &str) -> VaultResult<EngineOutput>;
}

/// Location an external restore subsystem reads staged archives from
pub trait StagingArea {
    /// Make sure the staging directory exists and return it
    ///
    /// Fails with `StagingUnavailable` when it cannot be prepared.
    fn ensure_ready(&self) -> VaultResult<PathBuf>;
}
