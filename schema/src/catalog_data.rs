use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a species in the catalog (its Pokedex id).
pub type SpeciesId = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprites {
    pub front_default: String,
    pub front_shiny: String,
}

/// Immutable reference data for a single species.
///
/// Physical attributes are kept as the raw strings published by the upstream
/// data source (decimetres / hectograms), the engine never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub id: SpeciesId,
    pub order: String,
    pub name: String,
    pub height: String,
    pub weight: String,
    #[serde(default)]
    pub sprites: Sprites,
}

impl fmt::Display for CatalogEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{:03})", self.name, self.id)
    }
}
