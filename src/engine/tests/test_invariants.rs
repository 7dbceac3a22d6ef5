//! Property-based tests for record invariants
//!
//! After any sequence of engine operations, every stored record satisfies:
//! - `0 <= health <= max_health`
//! - `1 <= level <= 100`
//! - `max_health` follows the level (100 + 10 per level gained)
//! - `experience_to_next_level == level * 100`
//! - level never goes down while the record exists

#[cfg(test)]
mod tests {
    use crate::catalog::InMemoryCatalog;
    use crate::engine::tests::common::*;
    use crate::engine::OwnershipEngine;
    use crate::errors::OwnershipError;
    use crate::progression::battle::BattleRequest;
    use crate::progression::leveling::{BASE_MAX_HEALTH, HEALTH_PER_LEVEL};
    use crate::progression::{SeededRandom, TrainingPlan, MAX_LEVEL};
    use crate::store::{InMemoryOwnershipStore, OwnershipStore};
    use proptest::prelude::*;
    use schema::{SpeciesId, TrainingKind};
    use std::collections::HashMap;
    use std::sync::Arc;

    const SPECIES: [SpeciesId; 4] = [BULBASAUR, CHARMANDER, SQUIRTLE, PIKACHU];

    #[derive(Debug, Clone)]
    enum Op {
        Catch(SpeciesId),
        TrainExperience(SpeciesId, u32),
        TrainHealth(SpeciesId, u32),
        Battle(SpeciesId),
        Heal(SpeciesId),
        LevelUp(SpeciesId),
        BulkLevelUp(u32),
        BulkHeal,
    }

    fn arb_species() -> impl Strategy<Value = SpeciesId> {
        prop::sample::select(SPECIES.to_vec())
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            2 => arb_species().prop_map(Op::Catch),
            2 => (arb_species(), 1u32..=1000).prop_map(|(s, a)| Op::TrainExperience(s, a)),
            1 => (arb_species(), 1u32..=1000).prop_map(|(s, a)| Op::TrainHealth(s, a)),
            4 => arb_species().prop_map(Op::Battle),
            1 => arb_species().prop_map(Op::Heal),
            1 => arb_species().prop_map(Op::LevelUp),
            1 => (1u32..=99).prop_map(Op::BulkLevelUp),
            1 => Just(Op::BulkHeal),
        ]
    }

    async fn apply(engine: &OwnershipEngine, op: &Op) -> Result<(), OwnershipError> {
        match *op {
            Op::Catch(species) => engine.catch(OWNER, species, None).await.map(drop),
            Op::TrainExperience(species, amount) => {
                let plan = TrainingPlan::new(TrainingKind::Experience, amount)?;
                engine.train(OWNER, species, plan).await.map(drop)
            }
            Op::TrainHealth(species, amount) => {
                let plan = TrainingPlan::new(TrainingKind::Health, amount)?;
                engine.train(OWNER, species, plan).await.map(drop)
            }
            Op::Battle(species) => {
                let request = BattleRequest {
                    opponent_species_id: PIKACHU,
                    battle_type: "wild".to_string(),
                };
                engine.battle(OWNER, species, &request).await.map(drop)
            }
            Op::Heal(species) => engine.heal(OWNER, species).await.map(drop),
            Op::LevelUp(species) => engine.level_up(OWNER, species).await.map(drop),
            Op::BulkLevelUp(levels) => engine.bulk_level_up(OWNER, levels).await.map(drop),
            Op::BulkHeal => engine.bulk_heal(OWNER).await.map(drop),
        }
    }

    fn expected_error(error: &OwnershipError) -> bool {
        matches!(
            error,
            OwnershipError::NotOwned { .. }
                | OwnershipError::AlreadyOwned { .. }
                | OwnershipError::Incapacitated { .. }
                | OwnershipError::MaxLevelReached { .. }
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_invariants_hold_over_operation_sequences(
            seed in any::<u64>(),
            ops in prop::collection::vec(arb_op(), 1..60),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let outcome: Result<(), TestCaseError> = runtime.block_on(async move {
                let store = Arc::new(InMemoryOwnershipStore::new());
                let engine = OwnershipEngine::new(store.clone(), Arc::new(fixture_catalog()))
                    .with_random_source(Arc::new(SeededRandom::new(seed)));
                let mut last_levels: HashMap<SpeciesId, u32> = HashMap::new();

                for op in &ops {
                    if let Err(error) = apply(&engine, op).await {
                        prop_assert!(expected_error(&error), "{:?} failed with {:?}", op, error);
                    }

                    for record in store.owner_records(OWNER).await.unwrap() {
                        prop_assert!(record.health <= record.max_health, "{:?}", record);
                        prop_assert!((1..=MAX_LEVEL).contains(&record.level), "{:?}", record);
                        prop_assert_eq!(
                            record.max_health,
                            BASE_MAX_HEALTH + (record.level - 1) * HEALTH_PER_LEVEL
                        );
                        prop_assert_eq!(record.experience_to_next_level, record.level * 100);

                        let previous = last_levels.insert(record.species_id, record.level);
                        prop_assert!(previous.unwrap_or(1) <= record.level);
                    }
                }
                Ok(())
            });
            outcome?;
        }
    }

    #[test]
    fn test_catalog_fixture_covers_sampled_species() {
        let catalog: InMemoryCatalog = fixture_catalog();
        let ids: Vec<SpeciesId> = catalog.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, SPECIES.to_vec());
    }
}
