use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What a training session improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TrainingKind {
    Experience,
    Health,
}

/// Outcome of a single battle, from the owner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BattleOutcome {
    Won,
    Lost,
    Draw,
}

impl BattleOutcome {
    /// All outcomes, in the order a uniform three-way draw indexes them
    pub const ALL: [BattleOutcome; 3] = [BattleOutcome::Won, BattleOutcome::Lost, BattleOutcome::Draw];

    pub fn from_index(index: usize) -> BattleOutcome {
        Self::ALL[index % Self::ALL.len()]
    }
}
