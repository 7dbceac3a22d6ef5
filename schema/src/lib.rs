// Pokemon Ownership Schema - Shared type definitions
// This crate contains the catalog and ownership records that are shared between
// the engine, its persistence layer and any host surface, so every side agrees
// on one serialized shape (RON for catalog files, postcard for store snapshots).

// Re-export the main types
pub use catalog_data::*;
pub use ownership_data::*;
pub use progression_types::*;

pub mod catalog_data;
pub mod ownership_data;
pub mod progression_types;
