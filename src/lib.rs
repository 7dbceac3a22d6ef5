// In: src/lib.rs

//! Pokemon Ownership Engine
//!
//! Per-user ownership of catalog species and their RPG-style progression:
//! catching, training, battling, healing and releasing, plus paginated
//! listing and collection statistics. Storage, catalog, randomness and time
//! are injected, so the same engine runs against the in-memory store shipped
//! here or any other `OwnershipStore`.

// --- MODULE DECLARATIONS ---
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod mcp_interface;
pub mod progression;
pub mod query;
pub mod stats;
pub mod store;
pub mod views;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Shared data definitions.
pub use schema::{
    BattleOutcome, CatalogEntity, OwnerId, OwnershipRecord, SpeciesId, Sprites, TrainingKind,
};

// --- From this crate's modules (`src/`) ---

// The engine and its injected collaborators.
pub use catalog::{CatalogStore, InMemoryCatalog};
pub use engine::{Clock, MetaUpdate, OwnershipEngine, SystemClock};
pub use progression::{
    BattlePolicy, BattleRequest, RandomSource, ScriptedRandom, SeededRandom, ThreadRandom,
    TrainingPlan,
};
pub use store::{InMemoryOwnershipStore, OwnershipStore, RecordKey};

// Requests and results.
pub use query::ListQuery;
pub use stats::OwnershipStats;
pub use views::{
    BattleResultView, BattleStats, HealResultView, OwnedPokemonView, PagedResult,
    TrainingResultView,
};

// Configuration and crate-specific error and result types.
pub use config::{ConfigError, EngineConfig};
pub use errors::{
    ErrorKind, OwnershipError, OwnershipResult, StoreError, StoreResult, ValidationError,
};
