//! Tar backup engine
//!
//! Packs the source directory of a registered resource into a tar archive in
//! scratch space. The orchestrator copies it into the archive store and the
//! scratch file is discarded afterwards.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::{VaultError, VaultResult};
use crate::models::ResourceId;
use crate::storage::ResourceRegistry;

use super::{ArtifactHandle, BackupEngine, EngineOutput};

/// Engine that archives a resource's source directory with `tar`
pub struct TarEngine<'a> {
    resources: &'a ResourceRegistry,
    scratch_dir: PathBuf,
}

impl<'a> TarEngine<'a> {
    pub fn new(resources: &'a ResourceRegistry, scratch_dir: PathBuf) -> Self {
        Self {
            resources,
            scratch_dir,
        }
    }

    fn source_dir(&self, resource_id: ResourceId) -> VaultResult<PathBuf> {
        let resource = self
            .resources
            .get(resource_id)?
            .ok_or_else(|| VaultError::Engine(format!("Resource {} is not registered", resource_id)))?;

        let dir = resource.source_dir.ok_or_else(|| {
            VaultError::Engine(format!("Resource {} has no source directory", resource_id))
        })?;

        if !dir.is_dir() {
            return Err(VaultError::Engine(format!(
                "Source directory {} for resource {} does not exist",
                dir.display(),
                resource_id
            )));
        }

        Ok(dir)
    }

    fn pack(&self, source: &Path, resource_id: ResourceId) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.scratch_dir)?;

        let path = self.scratch_dir.join(format!(
            "resource-{}-{}.tar",
            resource_id,
            Uuid::new_v4().simple()
        ));

        let result = (|| -> io::Result<()> {
            let file = File::create(&path)?;
            let mut builder = tar::Builder::new(file);
            builder.follow_symlinks(false);
            builder.append_dir_all(".", source)?;
            let file = builder.into_inner()?;
            file.sync_all()
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        Ok(path)
    }
}

impl BackupEngine for TarEngine<'_> {
    fn execute(&self, resource_id: ResourceId, requester: &str) -> VaultResult<EngineOutput> {
        let source = self.source_dir(resource_id)?;
        debug!(resource_id = %resource_id, requester, source = %source.display(), "packing resource");

        let has_files = contains_files(&source).map_err(|e| {
            VaultError::Engine(format!("Failed to scan {}: {}", source.display(), e))
        })?;
        if !has_files {
            return Ok(EngineOutput::Empty);
        }

        let path = self.pack(&source, resource_id).map_err(|e| {
            VaultError::Engine(format!("Failed to pack {}: {}", source.display(), e))
        })?;

        Ok(EngineOutput::Produced(ArtifactHandle::scratch(path)))
    }
}

/// Whether `dir` holds at least one regular file at any depth
fn contains_files(dir: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_file() {
            return Ok(true);
        }
        if file_type.is_dir() && contains_files(&entry.path())? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;
    use tempfile::TempDir;

    fn registry_with(temp_dir: &TempDir, source: Option<PathBuf>) -> ResourceRegistry {
        let registry = ResourceRegistry::new(temp_dir.path().join("resources.json"));
        let mut resource = Resource::new(ResourceId::new(42), "Algebra 101", "ALG101");
        resource.source_dir = source;
        registry.upsert(resource).unwrap();
        registry
    }

    #[test]
    fn test_packs_source_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("course");
        fs::create_dir_all(source.join("files")).unwrap();
        fs::write(source.join("files").join("notes.txt"), b"lecture notes").unwrap();

        let registry = registry_with(&temp_dir, Some(source));
        let engine = TarEngine::new(&registry, temp_dir.path().join("scratch"));

        let output = engine.execute(ResourceId::new(42), "admin").unwrap();
        let EngineOutput::Produced(artifact) = output else {
            panic!("expected an artifact");
        };

        assert!(artifact.is_usable());
        assert!(artifact.is_scratch());

        let mut archive = tar::Archive::new(File::open(artifact.path()).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names.iter().any(|n| n.ends_with("notes.txt")));
    }

    #[test]
    fn test_empty_source_produces_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("course");
        fs::create_dir_all(source.join("empty-subdir")).unwrap();

        let registry = registry_with(&temp_dir, Some(source));
        let engine = TarEngine::new(&registry, temp_dir.path().join("scratch"));

        let output = engine.execute(ResourceId::new(42), "admin").unwrap();
        assert!(matches!(output, EngineOutput::Empty));
    }

    #[test]
    fn test_missing_source_is_engine_error() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry_with(&temp_dir, Some(temp_dir.path().join("gone")));
        let engine = TarEngine::new(&registry, temp_dir.path().join("scratch"));

        let err = engine.execute(ResourceId::new(42), "admin").unwrap_err();
        assert!(matches!(err, VaultError::Engine(_)));
    }

    #[test]
    fn test_no_source_configured_is_engine_error() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry_with(&temp_dir, None);
        let engine = TarEngine::new(&registry, temp_dir.path().join("scratch"));

        assert!(engine.execute(ResourceId::new(42), "admin").is_err());
        assert!(engine.execute(ResourceId::new(7), "admin").is_err());
    }
}
