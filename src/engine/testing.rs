//! Test doubles for the collaborator traits

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{VaultError, VaultResult};
use crate::models::{ResourceId, ResourceInfo};
use crate::storage::BackupCatalog;

use super::{ArtifactHandle, BackupEngine, EngineOutput, ResourceProvider, StagingArea};

/// In-memory resource provider
#[derive(Default)]
pub(crate) struct StaticResources {
    resources: HashMap<ResourceId, ResourceInfo>,
}

impl StaticResources {
    pub(crate) fn with(mut self, id: u64, display_name: &str, short_name: &str) -> Self {
        let id = ResourceId::new(id);
        self.resources.insert(
            id,
            ResourceInfo {
                id,
                display_name: display_name.to_string(),
                short_name: short_name.to_string(),
            },
        );
        self
    }
}

impl ResourceProvider for StaticResources {
    fn get_resource(&self, id: ResourceId) -> VaultResult<ResourceInfo> {
        self.resources
            .get(&id)
            .cloned()
            .ok_or_else(|| VaultError::resource_not_found(id.to_string()))
    }
}

/// What a [`ScriptedEngine`] does when executed
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Write these bytes to a scratch artifact
    Produce(Vec<u8>),
    /// Report a produced artifact whose file was never written
    ProduceMissing,
    /// Report that nothing was produced
    Empty,
    /// Fail with an engine error
    Fail(String),
    /// Mark the resource's pending records failed through a second handle on
    /// the catalog at `catalog`, then write these bytes
    ProduceAfterFailedElsewhere { bytes: Vec<u8>, catalog: PathBuf },
}

/// Engine that follows a fixed script and counts its runs
pub(crate) struct ScriptedEngine {
    script: Script,
    scratch_dir: PathBuf,
    runs: Cell<usize>,
}

impl ScriptedEngine {
    pub(crate) fn new(script: Script, scratch_dir: PathBuf) -> Self {
        Self {
            script,
            scratch_dir,
            runs: Cell::new(0),
        }
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.get()
    }
}

impl BackupEngine for ScriptedEngine {
    fn execute(&self, resource_id: ResourceId, _requester: &str) -> VaultResult<EngineOutput> {
        let run = self.runs.get() + 1;
        self.runs.set(run);

        let path = self
            .scratch_dir
            .join(format!("engine-{}-{}.bin", resource_id, run));

        match &self.script {
            Script::Produce(bytes) => {
                fs::create_dir_all(&self.scratch_dir)?;
                fs::write(&path, bytes)?;
                Ok(EngineOutput::Produced(ArtifactHandle::scratch(path)))
            }
            Script::ProduceMissing => Ok(EngineOutput::Produced(ArtifactHandle::scratch(path))),
            Script::Empty => Ok(EngineOutput::Empty),
            Script::Fail(message) => Err(VaultError::Engine(message.clone())),
            Script::ProduceAfterFailedElsewhere { bytes, catalog } => {
                let other = BackupCatalog::open(catalog.clone())?;
                for record in other.list_for_resource(resource_id)? {
                    if record.is_pending() {
                        other.mark_failed_with(record.id, Some("cancelled".into()))?;
                    }
                }
                fs::create_dir_all(&self.scratch_dir)?;
                fs::write(&path, bytes)?;
                Ok(EngineOutput::Produced(ArtifactHandle::scratch(path)))
            }
        }
    }
}

/// Staging area that can never be prepared
pub(crate) struct UnavailableStaging;

impl StagingArea for UnavailableStaging {
    fn ensure_ready(&self) -> VaultResult<PathBuf> {
        Err(VaultError::StagingUnavailable("staging disabled".into()))
    }
}
