//! Entity registry for TableSync
//!
//! This module manages the registration and discovery of table descriptors.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::schema::types::TableDescriptor;

/// A record type that maps onto a managed table
///
/// Usually implemented through `#[derive(Entity)]`.
pub trait Entity {
    /// Build the descriptor for this record type
    fn table_descriptor() -> TableDescriptor;
}

/// A registered descriptor and where it came from
#[derive(Debug, Clone)]
struct RegisteredEntity {
    descriptor: TableDescriptor,
    /// Exported by a dependency crate rather than the local one
    packaged: bool,
}

/// Registry of table descriptors, keyed by owner path
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: IndexMap<String, RegisteredEntity>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local record type
    pub fn register<E: Entity>(&mut self) {
        self.register_descriptor(E::table_descriptor(), false);
    }

    /// Register a record type exported by a dependency crate
    pub fn register_packaged<E: Entity>(&mut self) {
        self.register_descriptor(E::table_descriptor(), true);
    }

    /// Register an explicit descriptor
    ///
    /// A descriptor whose owner is already registered replaces the earlier one
    /// but keeps its position.
    pub fn register_descriptor(&mut self, descriptor: TableDescriptor, packaged: bool) {
        let key = if descriptor.owner.is_empty() {
            format!("table:{}", descriptor.table_name)
        } else {
            descriptor.owner.clone()
        };

        tracing::debug!(owner = %key, packaged, "Registered entity");
        self.entities
            .insert(key, RegisteredEntity { descriptor, packaged });
    }

    /// Descriptors whose owner lies under any configured search root
    ///
    /// Descriptors without an owner, such as those read from a descriptor
    /// file, are not tied to a module and are always included.
    pub fn discover(&self, config: &SyncConfig) -> Vec<TableDescriptor> {
        if config.packages.is_empty() {
            tracing::warn!("No search roots configured; only ownerless descriptors are synchronized");
        }

        let found: Vec<TableDescriptor> = self
            .entities
            .values()
            .filter(|entity| config.scan_archives || !entity.packaged)
            .filter(|entity| {
                let owner = &entity.descriptor.owner;
                owner.is_empty() || config.packages.iter().any(|root| is_under_root(owner, root))
            })
            .map(|entity| entity.descriptor.clone())
            .collect();

        tracing::info!(count = found.len(), "Discovered table descriptors");
        found
    }

    /// Number of registered descriptors
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn is_under_root(owner: &str, root: &str) -> bool {
    let root = root.trim().trim_end_matches("::");
    if root.is_empty() {
        return true;
    }

    owner == root
        || owner
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with("::"))
}

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    tables: Vec<TableDescriptor>,
}

/// Load table descriptors from a `[[tables]]` file
///
/// The format follows the extension: `.yaml`/`.yml`, `.json`, otherwise TOML.
pub fn load_descriptors(path: &str) -> Result<Vec<TableDescriptor>> {
    let content = fs::read_to_string(path)?;

    let file: DescriptorFile = match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)
            .map_err(|e| Error::SerializationError(format!("{}: {}", path, e)))?,
    };

    tracing::debug!(path, count = file.tables.len(), "Loaded descriptor file");
    Ok(file.tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("app::entity::User", "app::entity", true)]
    #[case("app::entity", "app::entity", true)]
    #[case("app::entity::User", "app::entity::", true)]
    #[case("app::entity_extra::User", "app::entity", false)]
    #[case("other::entity::User", "app::entity", false)]
    #[case("app::User", "app::entity", false)]
    fn matches_module_path_roots(#[case] owner: &str, #[case] root: &str, #[case] expected: bool) {
        assert_eq!(is_under_root(owner, root), expected);
    }

    #[test]
    fn reregistering_an_owner_keeps_one_entry() {
        let mut registry = EntityRegistry::new();
        registry.register_descriptor(TableDescriptor::new("app::User", "user"), false);
        registry.register_descriptor(TableDescriptor::new("app::Order", "orders"), false);
        registry.register_descriptor(TableDescriptor::new("app::User", "users"), false);

        assert_eq!(registry.len(), 2);

        let config = SyncConfig {
            packages: vec!["app".to_string()],
            ..SyncConfig::default()
        };
        let names: Vec<String> = registry
            .discover(&config)
            .into_iter()
            .map(|d| d.table_name)
            .collect();
        assert_eq!(names, vec!["users".to_string(), "orders".to_string()]);
    }
}
