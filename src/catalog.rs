//! Read-only species catalog.
//!
//! The engine only ever looks species up by id; seeding and editing the
//! catalog happen outside of it.

use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use schema::{CatalogEntity, SpeciesId};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Lookup of species reference data
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_by_id(&self, species_id: SpeciesId) -> StoreResult<Option<CatalogEntity>>;
}

/// Catalog held entirely in memory, usually loaded from a RON file
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    species: HashMap<SpeciesId, CatalogEntity>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<CatalogEntity>) -> Self {
        let mut species = HashMap::with_capacity(entries.len());
        for entry in entries {
            if let Some(previous) = species.insert(entry.id, entry) {
                tracing::warn!(
                    species_id = previous.id,
                    name = %previous.name,
                    "duplicate catalog entry, keeping the later one"
                );
            }
        }
        Self { species }
    }

    /// Parse a RON list of catalog entities, e.g. `[(id: 1, order: "1", name: "bulbasaur", ...)]`
    pub fn from_ron_str(content: &str) -> StoreResult<Self> {
        let entries: Vec<CatalogEntity> = ron::from_str(content)
            .map_err(|e| StoreError::Unavailable(format!("Malformed catalog data: {}", e)))?;
        Ok(Self::new(entries))
    }

    /// Load the catalog from a RON file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Unavailable(format!(
                "Catalog file {} could not be read: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_ron_str(&content)?;
        tracing::info!(
            path = %path.display(),
            species = catalog.len(),
            "loaded species catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// All entries ordered by species id
    pub fn entries(&self) -> Vec<&CatalogEntity> {
        let mut entries: Vec<&CatalogEntity> = self.species.values().collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_by_id(&self, species_id: SpeciesId) -> StoreResult<Option<CatalogEntity>> {
        Ok(self.species.get(&species_id).cloned())
    }
}
