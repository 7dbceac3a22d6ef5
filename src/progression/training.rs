use super::leveling::{cascade_level_ups, restore_health};
use crate::errors::ValidationError;
use schema::{OwnershipRecord, TrainingKind};
use std::str::FromStr;

// Bounds for a single training session
pub const MIN_TRAINING_AMOUNT: u32 = 1;
pub const MAX_TRAINING_AMOUNT: u32 = 1000;

/// A validated training request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPlan {
    pub kind: TrainingKind,
    pub amount: u32,
}

impl TrainingPlan {
    pub fn new(kind: TrainingKind, amount: u32) -> Result<Self, ValidationError> {
        if !(MIN_TRAINING_AMOUNT..=MAX_TRAINING_AMOUNT).contains(&amount) {
            return Err(ValidationError::AmountOutOfRange {
                amount,
                min: MIN_TRAINING_AMOUNT,
                max: MAX_TRAINING_AMOUNT,
            });
        }
        Ok(Self { kind, amount })
    }

    /// Parse the wire form, e.g. `("Experience", 150)`.
    /// Unknown kinds are rejected rather than treated as a no-op.
    pub fn parse(kind: &str, amount: u32) -> Result<Self, ValidationError> {
        let kind = TrainingKind::from_str(kind.trim())
            .map_err(|_| ValidationError::UnknownTrainingKind(kind.to_string()))?;
        Self::new(kind, amount)
    }
}

/// What a training session changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingOutcome {
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    pub experience_gained: u32,
    pub new_experience: u32,
    pub new_experience_to_next_level: u32,
}

/// Apply a training session to a record.
///
/// Experience training may level up several times in one call, healing fully
/// on each level. Health training only restores health, up to the maximum.
pub fn apply_training(record: &mut OwnershipRecord, plan: TrainingPlan) -> TrainingOutcome {
    let previous_level = record.level;

    let (leveled_up, experience_gained) = match plan.kind {
        TrainingKind::Experience => {
            record.experience = record.experience.saturating_add(plan.amount);
            (cascade_level_ups(record) > 0, plan.amount)
        }
        TrainingKind::Health => {
            restore_health(record, plan.amount);
            (false, 0)
        }
    };

    TrainingOutcome {
        leveled_up,
        previous_level,
        new_level: record.level,
        experience_gained,
        new_experience: record.experience,
        new_experience_to_next_level: record.experience_to_next_level,
    }
}
