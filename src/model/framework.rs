//! Taxonomy registry boundary
//!
//! The editor never downloads frameworks itself. It asks a
//! [`FrameworkRegistry`] for the entries of a framework version and builds a
//! strict [`Listing`] from them; when the registry does not know the
//! framework a dynamic listing is used instead so the data still loads.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::listing::Listing;
use crate::error::RegistryError;

/// One framework object as published by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkEntry {
    pub id: String,
    pub name: String,
}

/// A published framework version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub entries: Vec<FrameworkEntry>,
}

impl Framework {
    pub fn to_listing(&self) -> Listing {
        Listing::strict(
            &self.id,
            &self.version,
            self.entries.iter().map(|e| (e.id.as_str(), e.name.as_str())),
        )
    }
}

/// Source of framework definitions
pub trait FrameworkRegistry {
    fn get_framework(&self, id: &str, version: &str) -> Result<Framework, RegistryError>;
}

/// Build the listing for one side of a collection
///
/// A registry miss falls back to a dynamic listing; any other registry
/// failure is propagated.
pub fn resolve_listing(
    registry: &dyn FrameworkRegistry,
    id: &str,
    version: &str,
) -> Result<Listing, RegistryError> {
    match registry.get_framework(id, version) {
        Ok(framework) => {
            tracing::debug!(
                framework = id,
                version,
                entries = framework.entries.len(),
                "using strict listing"
            );
            Ok(framework.to_listing())
        }
        Err(RegistryError::NotFound { .. }) => {
            tracing::warn!(framework = id, version, "framework not registered, using dynamic listing");
            Ok(Listing::dynamic(id, version))
        }
        Err(err) => Err(err),
    }
}

/// In-memory registry
#[derive(Debug, Clone, Default)]
pub struct FrameworkStore {
    frameworks: HashMap<(String, String), Framework>,
}

impl FrameworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, framework: Framework) {
        self.frameworks.insert(
            (framework.id.clone(), framework.version.clone()),
            framework,
        );
    }

    /// Register a framework from a JSON file
    pub fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading framework {}", path.display()))?;
        let framework: Framework = serde_json::from_str(&content)
            .with_context(|| format!("parsing framework {}", path.display()))?;
        tracing::info!(
            framework = %framework.id,
            version = %framework.version,
            "registered framework from {}",
            path.display()
        );
        self.register(framework);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frameworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
    }
}

impl FrameworkRegistry for FrameworkStore {
    fn get_framework(&self, id: &str, version: &str) -> Result<Framework, RegistryError> {
        self.frameworks
            .get(&(id.to_string(), version.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                id: id.to_string(),
                version: version.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListingKind;

    struct OfflineRegistry;

    impl FrameworkRegistry for OfflineRegistry {
        fn get_framework(&self, _id: &str, _version: &str) -> Result<Framework, RegistryError> {
            Err(RegistryError::Unavailable("offline".to_string()))
        }
    }

    fn attack() -> Framework {
        Framework {
            id: "attack".to_string(),
            version: "16".to_string(),
            entries: vec![FrameworkEntry {
                id: "T1001".to_string(),
                name: "Data Obfuscation".to_string(),
            }],
        }
    }

    #[test]
    fn test_resolve_known_framework_is_strict() {
        let mut store = FrameworkStore::new();
        store.register(attack());
        let listing = resolve_listing(&store, "attack", "16").unwrap();
        assert_eq!(listing.kind(), ListingKind::Strict);
        assert_eq!(listing.text("T1001"), Some("Data Obfuscation"));
    }

    #[test]
    fn test_resolve_unknown_framework_is_dynamic() {
        let store = FrameworkStore::new();
        let listing = resolve_listing(&store, "attack", "17").unwrap();
        assert_eq!(listing.kind(), ListingKind::Dynamic);
        assert!(listing.is_empty());
    }

    #[test]
    fn test_resolve_propagates_unavailable() {
        let err = resolve_listing(&OfflineRegistry, "attack", "16").unwrap_err();
        assert_eq!(err, RegistryError::Unavailable("offline".to_string()));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attack.json");
        std::fs::write(&path, serde_json::to_string(&attack()).unwrap()).unwrap();

        let mut store = FrameworkStore::new();
        store.load_file(&path).unwrap();
        assert_eq!(store.get_framework("attack", "16").unwrap(), attack());
    }
}
