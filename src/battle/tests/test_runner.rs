#[cfg(test)]
mod tests {
    use crate::battle::ai::{Behavior, ScoringAI};
    use crate::battle::runner::{Battle, SideStatus};
    use crate::battle::state::{BattleType, GameState};
    use crate::battle::tests::common::{
        create_test_player, create_test_runner, test_data, TestPokemonBuilder,
    };
    use crate::config::BattleConfig;
    use crate::errors::{BattleError, DataError, InvalidActionError, InvalidRosterError};
    use crate::player::{PlayerAction, Trainer};
    use crate::teams::create_trainer;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn start(player1: Trainer, player2: Trainer) -> Result<Battle, InvalidRosterError> {
        Battle::new(
            Arc::new(test_data()),
            player1,
            player2,
            &BattleConfig::trainer().with_seed(1),
        )
    }

    fn one_pikachu(name: &str) -> Trainer {
        create_test_player(name, vec![TestPokemonBuilder::new("Pikachu", 5).build()])
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let result = start(create_test_player("Ash", vec![]), one_pikachu("Brock"));
        assert!(matches!(result, Err(InvalidRosterError::Empty { trainer }) if trainer == "Ash"));
    }

    #[test]
    fn test_oversized_roster_is_rejected() {
        let team = (0..7)
            .map(|_| TestPokemonBuilder::new("Pikachu", 5).build())
            .collect();
        let result = start(one_pikachu("Ash"), create_test_player("Brock", team));
        assert!(matches!(
            result,
            Err(InvalidRosterError::TooLarge { size: 7, max: 6, .. })
        ));
    }

    #[test]
    fn test_fully_fainted_roster_is_rejected() {
        let fainted = create_test_player(
            "Brock",
            vec![TestPokemonBuilder::new("Onix", 5).with_hp(0).build()],
        );
        let result = start(one_pikachu("Ash"), fainted);
        assert!(matches!(result, Err(InvalidRosterError::AllFainted { .. })));
    }

    #[test]
    fn test_unknown_move_is_rejected() {
        let mut pikachu = TestPokemonBuilder::new("Pikachu", 5).build();
        pikachu.moves[0].name = "Hyper Beam".to_string();
        let result = start(create_test_player("Ash", vec![pikachu]), one_pikachu("Brock"));
        assert!(matches!(
            result,
            Err(InvalidRosterError::UnknownMove { move_name, .. }) if move_name == "Hyper Beam"
        ));
    }

    #[test]
    fn test_battle_between_named_trainers() {
        let data = Arc::new(test_data());
        let config = BattleConfig::trainer();

        let battle = Battle::between(Arc::clone(&data), "Ash", "Brock", &config).unwrap();
        assert_eq!(battle.get_state().trainers[1].name, "Brock");

        let missing = Battle::between(data, "Ash", "Gary", &config);
        assert!(matches!(
            missing,
            Err(BattleError::Data(DataError::UnknownTrainer(name))) if name == "Gary"
        ));
    }

    #[test]
    fn test_fainted_lead_is_moved_aside() {
        let player1 = create_test_player(
            "Ash",
            vec![
                TestPokemonBuilder::new("Pikachu", 5).with_hp(0).build(),
                TestPokemonBuilder::new("Squirtle", 5).build(),
            ],
        );
        let battle = start(player1, one_pikachu("Brock")).unwrap();

        let state = battle.get_state();
        assert_eq!(state.trainers[0].active_index, 1);
        assert_eq!(state.trainers[0].status, SideStatus::Active);
        assert_eq!(state.game_state, GameState::WaitingForActions);
    }

    #[test]
    fn test_resolving_early_is_rejected() {
        let mut battle = create_test_runner(one_pikachu("Ash"), one_pikachu("Brock"));
        assert_eq!(battle.resolve_turn(), Err(InvalidActionError::ActionsPending));

        battle.submit_action(0, PlayerAction::Flee).unwrap();
        assert!(!battle.ready_for_turn_resolution());
        assert_eq!(battle.players_needing_actions(), vec![1]);
        assert_eq!(battle.resolve_turn(), Err(InvalidActionError::ActionsPending));
    }

    #[test]
    fn test_submission_errors() {
        let mut battle = create_test_runner(one_pikachu("Ash"), one_pikachu("Brock"));

        assert_eq!(
            battle.submit_action(2, PlayerAction::Flee),
            Err(InvalidActionError::InvalidPlayerIndex(2))
        );
        assert_eq!(
            battle.submit_action(0, PlayerAction::UseMove { move_index: 9 }),
            Err(InvalidActionError::InvalidMoveIndex(9))
        );

        battle.battle_state_mut().players[0].team[0].moves[0].uses = 0;
        assert_eq!(
            battle.submit_action(0, PlayerAction::UseMove { move_index: 0 }),
            Err(InvalidActionError::NoUsesLeft("Thunder Shock".to_string()))
        );
    }

    #[test]
    fn test_snapshot_describes_both_sides() {
        let data = test_data();
        let ash = create_trainer(&data, "Ash").unwrap();
        let brock = create_trainer(&data, "Brock").unwrap();
        let battle = create_test_runner(ash, brock);

        let state = battle.get_state();

        assert_eq!(state.turn_number, 1);
        assert_eq!(state.battle_type, BattleType::Trainer);
        assert!(!state.is_terminal);
        assert_eq!(state.winner, None);
        assert_eq!(state.trainers[0].name, "Ash");
        assert_eq!(state.trainers[0].team.len(), 2);
        assert_eq!(state.trainers[0].inventory.get("Poke Ball"), Some(&5));

        let onix = &state.trainers[1].team[0];
        assert_eq!(onix.species, "Onix");
        assert_eq!(onix.level, 8);
        assert_eq!((onix.current_hp, onix.max_hp), (35, 35));
        assert_eq!(onix.moves.len(), 1);
        assert_eq!(onix.moves[0].name, "Tackle");
        assert_eq!(onix.moves[0].uses, 35);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["trainers"][1]["name"], "Brock");
        assert_eq!(json["game_state"], "WaitingForActions");
    }

    #[test]
    fn test_valid_actions_match_what_submit_accepts() {
        let data = test_data();
        let ash = create_trainer(&data, "Ash").unwrap();
        let mut battle = create_test_runner(ash, one_pikachu("Brock"));

        let actions = battle.valid_actions(0);

        assert_eq!(
            actions,
            vec![
                PlayerAction::UseMove { move_index: 0 },
                PlayerAction::UseMove { move_index: 1 },
                PlayerAction::SwitchPokemon { team_index: 1 },
                PlayerAction::UseItem {
                    item: "Poke Ball".to_string()
                },
                PlayerAction::UseItem {
                    item: "Potion".to_string()
                },
                PlayerAction::Flee,
            ]
        );

        battle.submit_action(0, actions[0].clone()).unwrap();
        assert!(battle.valid_actions(0).is_empty());
    }

    /// Plays both sides with the scoring AI until the battle ends.
    fn play_out(seed: u64) -> Battle {
        let data = test_data();
        let ash = create_trainer(&data, "Ash").unwrap();
        let brock = create_trainer(&data, "Brock").unwrap();
        let mut battle = Battle::new(
            Arc::new(data),
            ash,
            brock,
            &BattleConfig::trainer().with_seed(seed),
        )
        .unwrap();

        let ai = ScoringAI::new();
        for _ in 0..200 {
            if battle.is_battle_ended() {
                break;
            }
            for player_index in battle.players_needing_actions() {
                let action = ai.decide_action(player_index, battle.battle_state(), battle.data());
                battle.submit_action(player_index, action).unwrap();
            }
            battle.resolve_turn().unwrap();
        }
        battle
    }

    #[test]
    fn test_same_seed_replays_the_same_battle() {
        let first = play_out(11);
        let second = play_out(11);

        assert!(first.is_battle_ended());
        assert_eq!(first.get_all_events(), second.get_all_events());
        assert_eq!(first.get_state(), second.get_state());
    }
}
