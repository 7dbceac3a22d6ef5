use super::leveling::single_level_up_check;
use super::rng::RandomSource;
use chrono::{DateTime, Utc};
use schema::{BattleOutcome, OwnershipRecord, SpeciesId};
use serde::{Deserialize, Serialize};

/// A half-open range `min..max` of values a battle may draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRange {
    pub min: u32,
    pub max: u32,
}

impl DrawRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn draw(&self, rng: &dyn RandomSource, reason: &str) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.next_in_range(self.min, self.max, reason)
    }
}

/// Ranges used to resolve battles.
///
/// The opponent's own stats are not consulted: the outcome is a uniform
/// three-way draw and the rewards come from these ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlePolicy {
    pub health_lost: DrawRange,
    pub experience_reward: DrawRange,
}

impl Default for BattlePolicy {
    fn default() -> Self {
        Self {
            health_lost: DrawRange::new(10, 30),
            experience_reward: DrawRange::new(50, 100),
        }
    }
}

/// Who and how the owned Pokemon fights. Both fields are opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    pub opponent_species_id: SpeciesId,
    #[serde(default)]
    pub battle_type: String,
}

/// What a battle changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub experience_gained: u32,
    pub health_lost: u32,
    pub leveled_up: bool,
}

impl BattlePolicy {
    /// Resolve one battle against `record`.
    ///
    /// Draws happen in a fixed order: outcome, health lost, then experience
    /// (only on a win). A winning battle applies at most one level-up and does
    /// not heal. Callers reject incapacitated records before calling this.
    pub fn resolve(
        &self,
        record: &mut OwnershipRecord,
        rng: &dyn RandomSource,
        now: DateTime<Utc>,
    ) -> BattleReport {
        let outcome = BattleOutcome::from_index(
            rng.next_in_range(0, BattleOutcome::ALL.len() as u32, "battle outcome") as usize,
        );
        let mut health_lost = self.health_lost.draw(rng, "health lost");
        let mut experience_gained = 0;
        let mut leveled_up = false;

        match outcome {
            BattleOutcome::Won => {
                record.battles_won += 1;
                experience_gained = self.experience_reward.draw(rng, "experience reward");
                record.experience = record.experience.saturating_add(experience_gained);
                leveled_up = single_level_up_check(record);
            }
            BattleOutcome::Lost => {
                record.battles_lost += 1;
                health_lost = health_lost.min(record.health);
            }
            BattleOutcome::Draw => {}
        }

        record.health = record.health.saturating_sub(health_lost);
        record.last_battle_at = Some(now);

        BattleReport {
            outcome,
            experience_gained,
            health_lost,
            leveled_up,
        }
    }
}
