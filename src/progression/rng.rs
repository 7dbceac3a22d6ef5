use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of the random draws a battle consumes.
///
/// Every call is a fresh draw; implementations must not cache results across calls.
pub trait RandomSource: Send + Sync {
    /// Draw a value uniformly from `low..high` (inclusive-exclusive).
    /// `reason` names the draw for diagnostics.
    fn next_in_range(&self, low: u32, high: u32, reason: &str) -> u32;
}

/// Draws from the thread-local generator, seeded by the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_in_range(&self, low: u32, high: u32, _reason: &str) -> u32 {
        rand::rng().random_range(low..high)
    }
}

/// Reproducible generator for simulations and fuzzing
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_in_range(&self, low: u32, high: u32, _reason: &str) -> u32 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.random_range(low..high)
    }
}

/// Replays a fixed list of draws, in order.
///
/// Each scripted value must lie inside the range requested by the draw that
/// consumes it.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    outcomes: Mutex<VecDeque<u32>>,
}

impl ScriptedRandom {
    pub fn new(outcomes: Vec<u32>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    /// Queue more draws behind the ones not yet consumed
    pub fn push(&self, outcomes: impl IntoIterator<Item = u32>) {
        let mut queue = match self.outcomes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.extend(outcomes);
    }

    pub fn remaining(&self) -> usize {
        match self.outcomes.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_in_range(&self, low: u32, high: u32, reason: &str) -> u32 {
        let mut queue = match self.outcomes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(outcome) = queue.pop_front() else {
            panic!(
                "ScriptedRandom exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                reason
            );
        };
        if !(low..high).contains(&outcome) {
            panic!(
                "Scripted value {} for '{}' is outside {}..{}",
                outcome, reason, low, high
            );
        }

        tracing::trace!(outcome, reason, "consumed scripted draw");
        outcome
    }
}
