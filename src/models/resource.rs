//! Resource model
//!
//! A resource is the unit of data being backed up.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ids::ResourceId;

/// Naming metadata for a resource, as reported by a resource provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: ResourceId,
    pub display_name: String,
    pub short_name: String,
}

/// A resource registered with the local registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    pub short_name: String,

    /// Directory whose contents the tar engine archives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
}

impl Resource {
    pub fn new(
        id: ResourceId,
        display_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            short_name: short_name.into(),
            source_dir: None,
        }
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Validate the naming fields
    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("Resource display name cannot be empty".into());
        }
        if self.short_name.trim().is_empty() {
            return Err("Resource short name cannot be empty".into());
        }
        Ok(())
    }

    pub fn info(&self) -> ResourceInfo {
        ResourceInfo {
            id: self.id,
            display_name: self.display_name.clone(),
            short_name: self.short_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_validation() {
        let resource = Resource::new(ResourceId::new(1), "Algebra 101", "ALG101");
        assert!(resource.validate().is_ok());

        let blank = Resource::new(ResourceId::new(2), "  ", "X");
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_info_snapshot() {
        let resource = Resource::new(ResourceId::new(42), "Algebra 101", "ALG101")
            .with_source_dir("/srv/courses/42");
        let info = resource.info();
        assert_eq!(info.id, ResourceId::new(42));
        assert_eq!(info.short_name, "ALG101");
    }
}
