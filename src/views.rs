//! Result shapes handed back to callers.
//!
//! Everything here serializes as camelCase JSON, the wire form the host
//! surface returns.

use crate::progression::{BattleReport, TrainingOutcome};
use chrono::{DateTime, Utc};
use schema::{BattleOutcome, CatalogEntity, OwnershipRecord};
use serde::Serialize;

/// An ownership record joined with its catalog entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedPokemonView {
    #[serde(flatten)]
    pub record: OwnershipRecord,
    /// Absent only when the catalog no longer knows the species
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pokemon: Option<CatalogEntity>,
}

impl OwnedPokemonView {
    pub fn new(record: OwnershipRecord, pokemon: Option<CatalogEntity>) -> Self {
        Self { record, pokemon }
    }

    /// Name used for sorting; empty when the species is unknown
    pub fn species_name(&self) -> &str {
        self.pokemon.as_ref().map_or("", |entity| entity.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResultView {
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    pub experience_gained: u32,
    pub new_experience: u32,
    pub new_experience_to_next_level: u32,
}

impl From<TrainingOutcome> for TrainingResultView {
    fn from(outcome: TrainingOutcome) -> Self {
        Self {
            leveled_up: outcome.leveled_up,
            previous_level: outcome.previous_level,
            new_level: outcome.new_level,
            experience_gained: outcome.experience_gained,
            new_experience: outcome.new_experience,
            new_experience_to_next_level: outcome.new_experience_to_next_level,
        }
    }
}

/// Battle counters after a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleStats {
    pub battles_won: u32,
    pub battles_lost: u32,
    pub last_battle_at: Option<DateTime<Utc>>,
}

impl From<&OwnershipRecord> for BattleStats {
    fn from(record: &OwnershipRecord) -> Self {
        Self {
            battles_won: record.battles_won,
            battles_lost: record.battles_lost,
            last_battle_at: record.last_battle_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResultView {
    pub result: BattleOutcome,
    pub experience_gained: u32,
    pub health_lost: u32,
    pub leveled_up: bool,
    pub battle_stats: BattleStats,
}

impl BattleResultView {
    pub fn new(report: BattleReport, record: &OwnershipRecord) -> Self {
        Self {
            result: report.outcome,
            experience_gained: report.experience_gained,
            health_lost: report.health_lost,
            leveled_up: report.leveled_up,
            battle_stats: BattleStats::from(record),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealResultView {
    pub previous_health: u32,
    pub new_health: u32,
    pub fully_healed: bool,
}

/// One page of a larger result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}
