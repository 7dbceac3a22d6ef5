#[cfg(test)]
mod tests {
    use crate::engine::tests::common::*;
    use crate::errors::{ErrorKind, OwnershipError};
    use crate::progression::battle::BattleRequest;
    use crate::views::BattleStats;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::BattleOutcome;

    // Draw order: outcome index (0 won, 1 lost, 2 draw), health lost, then experience on a win
    const WON: u32 = 0;
    const LOST: u32 = 1;
    const DRAW: u32 = 2;

    fn against(opponent: u32) -> BattleRequest {
        BattleRequest {
            opponent_species_id: opponent,
            battle_type: "wild".to_string(),
        }
    }

    #[tokio::test]
    async fn test_win_awards_experience() {
        let harness = TestHarness::with_draws(
            vec![TestRecordBuilder::new(PIKACHU).build()],
            vec![WON, 15, 80],
        );

        let result = harness
            .engine
            .battle(OWNER, PIKACHU, &against(CHARMANDER))
            .await
            .unwrap();

        assert_eq!(result.result, BattleOutcome::Won);
        assert_eq!(result.experience_gained, 80);
        assert_eq!(result.health_lost, 15);
        assert!(!result.leveled_up);
        assert_eq!(
            result.battle_stats,
            BattleStats {
                battles_won: 1,
                battles_lost: 0,
                last_battle_at: Some(epoch()),
            }
        );
        let stored = harness.record(PIKACHU).await.unwrap();
        assert_eq!(stored.health, 85);
        assert_eq!(stored.experience, 80);
        assert_eq!(harness.rng.remaining(), 0);
    }

    #[tokio::test]
    async fn test_win_levels_up_at_most_once_without_heal() {
        let harness = TestHarness::with_draws(
            vec![TestRecordBuilder::new(PIKACHU)
                .with_experience(5000)
                .with_health(60)
                .build()],
            vec![WON, 20, 50],
        );

        let result = harness
            .engine
            .battle(OWNER, PIKACHU, &against(SQUIRTLE))
            .await
            .unwrap();

        assert!(result.leveled_up);
        let stored = harness.record(PIKACHU).await.unwrap();
        assert_eq!(stored.level, 2);
        assert_eq!(stored.experience, 4950);
        assert_eq!(stored.max_health, 110);
        assert_eq!(stored.health, 40);
    }

    #[tokio::test]
    async fn test_loss_never_reports_more_than_remaining_health() {
        let harness = TestHarness::with_draws(
            vec![TestRecordBuilder::new(PIKACHU).with_health(8).build()],
            vec![LOST, 29],
        );

        let result = harness
            .engine
            .battle(OWNER, PIKACHU, &against(BULBASAUR))
            .await
            .unwrap();

        assert_eq!(result.result, BattleOutcome::Lost);
        assert_eq!(result.health_lost, 8);
        assert_eq!(result.experience_gained, 0);
        assert_eq!(result.battle_stats.battles_lost, 1);
        assert_eq!(harness.record(PIKACHU).await.unwrap().health, 0);
    }

    #[tokio::test]
    async fn test_draw_floors_health_and_stamps_time() {
        let harness = TestHarness::with_draws(
            vec![TestRecordBuilder::new(PIKACHU)
                .with_health(12)
                .with_battles(2, 3)
                .build()],
            vec![DRAW, 25],
        );

        let result = harness
            .engine
            .battle(OWNER, PIKACHU, &against(BULBASAUR))
            .await
            .unwrap();

        assert_eq!(result.result, BattleOutcome::Draw);
        assert_eq!(result.battle_stats.battles_won, 2);
        assert_eq!(result.battle_stats.battles_lost, 3);
        let stored = harness.record(PIKACHU).await.unwrap();
        assert_eq!(stored.health, 0);
        assert_eq!(stored.last_battle_at, Some(epoch()));
    }

    #[rstest]
    #[case(BULBASAUR, "wild")]
    #[case(MISSINGNO, "")]
    #[case(PIKACHU, "gym-leader")]
    #[tokio::test]
    async fn test_fainted_pokemon_cannot_battle(#[case] opponent: u32, #[case] battle_type: &str) {
        let harness = TestHarness::new(vec![TestRecordBuilder::new(PIKACHU).with_health(0).build()]);
        let request = BattleRequest {
            opponent_species_id: opponent,
            battle_type: battle_type.to_string(),
        };

        let error = harness
            .engine
            .battle(OWNER, PIKACHU, &request)
            .await
            .unwrap_err();

        assert_eq!(error, OwnershipError::Incapacitated { species_id: PIKACHU });
        assert_eq!(error.kind(), ErrorKind::PreconditionFailed);
        // Nothing was drawn and nothing was written
        let stored = harness.record(PIKACHU).await.unwrap();
        assert_eq!(stored.last_battle_at, None);
    }

    #[tokio::test]
    async fn test_battle_missing_record_is_not_owned() {
        let harness = TestHarness::new(vec![]);

        let result = harness
            .engine
            .battle(OWNER, PIKACHU, &against(BULBASAUR))
            .await;

        assert!(matches!(result, Err(OwnershipError::NotOwned { .. })));
    }

    #[tokio::test]
    async fn test_each_battle_draws_fresh_values() {
        let harness = TestHarness::with_draws(
            vec![TestRecordBuilder::new(PIKACHU).build()],
            vec![LOST, 10, DRAW, 20],
        );

        let first = harness
            .engine
            .battle(OWNER, PIKACHU, &against(BULBASAUR))
            .await
            .unwrap();
        let second = harness
            .engine
            .battle(OWNER, PIKACHU, &against(BULBASAUR))
            .await
            .unwrap();

        assert_eq!(first.result, BattleOutcome::Lost);
        assert_eq!(second.result, BattleOutcome::Draw);
        assert_eq!(harness.record(PIKACHU).await.unwrap().health, 70);
    }
}
