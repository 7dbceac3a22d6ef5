use crate::progression::MAX_LEVEL;
use schema::OwnershipRecord;
use serde::Serialize;

/// Summary of one owner's collection, taken from a single snapshot of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipStats {
    pub total_pokemon: u64,
    pub favorite_pokemon: u64,
    pub average_level: f64,
    pub highest_level: u32,
    pub lowest_level: u32,
    pub total_battles_won: u64,
    pub total_battles_lost: u64,
    pub fainted_pokemon: u64,
    pub max_level_pokemon: u64,
    pub win_rate: f64,
}

/// Percentage of decided battles that were won, 0 when none were decided
pub fn win_rate(won: u64, lost: u64) -> f64 {
    let decided = won + lost;
    if decided == 0 {
        return 0.0;
    }
    won as f64 / decided as f64 * 100.0
}

impl OwnershipStats {
    pub fn from_records(records: &[OwnershipRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total_pokemon: records.len() as u64,
            lowest_level: u32::MAX,
            ..Self::default()
        };
        let mut level_sum: u64 = 0;

        for record in records {
            level_sum += u64::from(record.level);
            stats.highest_level = stats.highest_level.max(record.level);
            stats.lowest_level = stats.lowest_level.min(record.level);
            stats.total_battles_won += u64::from(record.battles_won);
            stats.total_battles_lost += u64::from(record.battles_lost);

            if record.is_favorite {
                stats.favorite_pokemon += 1;
            }
            if record.is_fainted() {
                stats.fainted_pokemon += 1;
            }
            if record.level == MAX_LEVEL {
                stats.max_level_pokemon += 1;
            }
        }

        stats.average_level = level_sum as f64 / stats.total_pokemon as f64;
        stats.win_rate = win_rate(stats.total_battles_won, stats.total_battles_lost);
        stats
    }
}
