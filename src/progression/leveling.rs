use chrono::{DateTime, Utc};
use schema::{OwnershipRecord, SpeciesId};

// Level and health bounds
pub const STARTING_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 100;
pub const BASE_MAX_HEALTH: u32 = 100;
pub const HEALTH_PER_LEVEL: u32 = 10;

// Experience curve: level * 100 to reach the next level
const EXPERIENCE_PER_LEVEL: u32 = 100;

/// Experience needed to leave `level`
pub fn experience_to_next_level(level: u32) -> u32 {
    level * EXPERIENCE_PER_LEVEL
}

/// Whether a level-up restores health to the new maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUpHeal {
    FullHeal,
    KeepHealth,
}

/// Build the record produced by a successful catch
pub fn new_caught_record(
    owner_id: &str,
    species_id: SpeciesId,
    nickname: Option<String>,
    caught_at: DateTime<Utc>,
) -> OwnershipRecord {
    OwnershipRecord {
        owner_id: owner_id.to_string(),
        species_id,
        caught_at,
        nickname,
        is_favorite: false,
        level: STARTING_LEVEL,
        experience: 0,
        experience_to_next_level: experience_to_next_level(STARTING_LEVEL),
        health: BASE_MAX_HEALTH,
        max_health: BASE_MAX_HEALTH,
        battles_won: 0,
        battles_lost: 0,
        last_battle_at: None,
    }
}

/// Raise the record one level. Callers check the cap first.
pub fn apply_level_up(record: &mut OwnershipRecord, heal: LevelUpHeal) {
    record.level += 1;
    record.max_health += HEALTH_PER_LEVEL;
    if heal == LevelUpHeal::FullHeal {
        record.health = record.max_health;
    }
    record.experience_to_next_level = experience_to_next_level(record.level);
}

fn has_enough_experience(record: &OwnershipRecord) -> bool {
    record.experience >= record.experience_to_next_level && record.level < MAX_LEVEL
}

/// Spend experience on as many level-ups as it covers, healing fully on each.
/// Experience left over at the cap is kept.
/// Returns the number of levels gained.
pub fn cascade_level_ups(record: &mut OwnershipRecord) -> u32 {
    let mut gained = 0;
    while has_enough_experience(record) {
        record.experience -= record.experience_to_next_level;
        apply_level_up(record, LevelUpHeal::FullHeal);
        gained += 1;
    }
    gained
}

/// Spend experience on at most one level-up, without healing.
pub fn single_level_up_check(record: &mut OwnershipRecord) -> bool {
    if !has_enough_experience(record) {
        return false;
    }
    record.experience -= record.experience_to_next_level;
    apply_level_up(record, LevelUpHeal::KeepHealth);
    true
}

/// Level up without spending experience: full heal and experience reset.
/// Returns false and leaves the record alone at the cap.
pub fn direct_level_up(record: &mut OwnershipRecord) -> bool {
    if record.level >= MAX_LEVEL {
        return false;
    }
    apply_level_up(record, LevelUpHeal::FullHeal);
    record.experience = 0;
    true
}

/// Apply up to `levels` direct level-ups, stopping at the cap.
/// Returns the number of levels actually gained.
pub fn add_levels(record: &mut OwnershipRecord, levels: u32) -> u32 {
    let mut gained = 0;
    while gained < levels && direct_level_up(record) {
        gained += 1;
    }
    gained
}

/// Restore health to the maximum, returning the health held before
pub fn heal_fully(record: &mut OwnershipRecord) -> u32 {
    let previous = record.health;
    record.health = record.max_health;
    previous
}

/// Add health without exceeding the maximum
pub fn restore_health(record: &mut OwnershipRecord, amount: u32) {
    record.health = record.health.saturating_add(amount).min(record.max_health);
}
