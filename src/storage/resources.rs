//! Resource repository for JSON storage
//!
//! Manages loading and saving registered resources to resources.json. The
//! registry is also the default [`ResourceProvider`] for the orchestrator.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::engine::ResourceProvider;
use crate::error::{VaultError, VaultResult};
use crate::models::{Resource, ResourceId, ResourceInfo};

use super::file_io::{read_json, write_json_atomic};

/// Serializable resource data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ResourceData {
    resources: Vec<Resource>,
}

/// Repository for resource persistence
pub struct ResourceRegistry {
    path: PathBuf,
    data: RwLock<BTreeMap<ResourceId, Resource>>,
}

impl ResourceRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a registry and load it from disk
    pub fn open(path: PathBuf) -> VaultResult<Self> {
        let registry = Self::new(path);
        registry.load()?;
        Ok(registry)
    }

    /// Load resources from disk
    pub fn load(&self) -> VaultResult<()> {
        let file_data: ResourceData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for resource in file_data.resources {
            data.insert(resource.id, resource);
        }

        Ok(())
    }

    /// Save resources to disk
    pub fn save(&self) -> VaultResult<()> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let file_data = ResourceData {
            resources: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: ResourceId) -> VaultResult<Option<Resource>> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// All resources ordered by id
    pub fn get_all(&self) -> VaultResult<Vec<Resource>> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().cloned().collect())
    }

    /// Insert or update a resource
    pub fn upsert(&self, resource: Resource) -> VaultResult<()> {
        resource.validate().map_err(VaultError::Validation)?;

        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(resource.id, resource);
        Ok(())
    }

    pub fn delete(&self, id: ResourceId) -> VaultResult<bool> {
        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> VaultResult<usize> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}

impl ResourceProvider for ResourceRegistry {
    fn get_resource(&self, id: ResourceId) -> VaultResult<ResourceInfo> {
        self.get(id)?
            .map(|r| r.info())
            .ok_or_else(|| VaultError::resource_not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ResourceRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resources.json");
        let repo = ResourceRegistry::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(
            Resource::new(ResourceId::new(42), "Algebra 101", "ALG101").with_source_dir("/srv/42"),
        )
        .unwrap();
        repo.save().unwrap();

        let reopened = ResourceRegistry::open(temp_dir.path().join("resources.json")).unwrap();
        let resource = reopened.get(ResourceId::new(42)).unwrap().unwrap();
        assert_eq!(resource.short_name, "ALG101");
        assert_eq!(resource.source_dir, Some(PathBuf::from("/srv/42")));
    }

    #[test]
    fn test_upsert_rejects_blank_names() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo
            .upsert(Resource::new(ResourceId::new(1), "", "X"))
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[test]
    fn test_provider_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Resource::new(ResourceId::new(42), "Algebra 101", "ALG101"))
            .unwrap();

        let info = repo.get_resource(ResourceId::new(42)).unwrap();
        assert_eq!(info.display_name, "Algebra 101");

        let err = repo.get_resource(ResourceId::new(43)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Resource::new(ResourceId::new(1), "A", "A")).unwrap();

        assert!(repo.delete(ResourceId::new(1)).unwrap());
        assert!(!repo.delete(ResourceId::new(1)).unwrap());
    }
}
