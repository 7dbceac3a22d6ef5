pub mod battle;
pub mod leveling;
pub mod rng;
pub mod training;

pub use battle::{BattlePolicy, BattleReport, BattleRequest, DrawRange};
pub use leveling::{experience_to_next_level, MAX_LEVEL};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use training::{apply_training, TrainingOutcome, TrainingPlan};
