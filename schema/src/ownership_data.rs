use crate::SpeciesId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an owning user, as supplied by the identity collaborator.
pub type OwnerId = String;

/// Progression state of one species owned by one user.
///
/// At most one record exists per `(owner_id, species_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub owner_id: OwnerId,
    pub species_id: SpeciesId,
    pub caught_at: DateTime<Utc>,
    pub nickname: Option<String>,
    pub is_favorite: bool,

    pub level: u32,
    pub experience: u32,
    pub experience_to_next_level: u32,
    pub health: u32,
    pub max_health: u32,

    pub battles_won: u32,
    pub battles_lost: u32,
    pub last_battle_at: Option<DateTime<Utc>>,
}

impl OwnershipRecord {
    pub fn is_fainted(&self) -> bool {
        self.health == 0
    }

    pub fn total_battles(&self) -> u32 {
        self.battles_won + self.battles_lost
    }
}
