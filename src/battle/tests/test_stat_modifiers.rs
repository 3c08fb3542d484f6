#[cfg(test)]
mod tests {
    use crate::battle::engine::{execute_end_turn_phase, resolve_turn};
    use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState};
    use crate::battle::tests::common::{
        create_test_battle, predictable_rng, test_data, TestPokemonBuilder,
    };
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use schema::StatModifier;

    fn play_turn(state: &mut BattleState, p1_move: usize) -> Vec<BattleEvent> {
        let data = test_data();
        state.queue_action(0, PlayerAction::UseMove { move_index: p1_move });
        state.queue_action(1, PlayerAction::UseMove { move_index: 0 });
        resolve_turn(state, &data, predictable_rng()).into_events()
    }

    #[test]
    fn test_debuff_lasts_its_rounds_then_expires() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5)
                .with_moves(vec!["Growl", "Splash"])
                .build(),
            TestPokemonBuilder::new("Charmander", 5)
                .with_moves(vec!["Splash"])
                .build(),
        );

        let events = play_turn(&mut state, 0);
        assert!(events.iter().any(|e| matches!(
            e,
            BattleEvent::Debuffed { target, rounds: 3, .. } if target == "Charmander"
        )));
        let charmander = &state.players[1].team[0];
        assert_eq!(charmander.effective_stats().attack, 47);
        assert_eq!(charmander.modifiers[0].rounds_remaining, 2);

        let events = play_turn(&mut state, 1);
        assert!(!events
            .iter()
            .any(|e| matches!(e, BattleEvent::ModifiersExpired { .. })));
        assert_eq!(state.players[1].team[0].effective_stats().attack, 47);

        let events = play_turn(&mut state, 1);
        assert!(events.contains(&BattleEvent::ModifiersExpired {
            target: "Charmander".to_string(),
            count: 1,
        }));
        assert_eq!(state.players[1].team[0].effective_stats().attack, 52);
        assert!(state.players[1].team[0].modifiers.is_empty());
    }

    #[test]
    fn test_debuffs_stack() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5)
                .with_moves(vec!["Growl"])
                .build(),
            TestPokemonBuilder::new("Charmander", 5)
                .with_moves(vec!["Splash"])
                .build(),
        );

        play_turn(&mut state, 0);
        play_turn(&mut state, 0);

        assert_eq!(state.players[1].team[0].modifiers.len(), 2);
        assert_eq!(state.players[1].team[0].effective_stats().attack, 42);
    }

    #[test]
    fn test_buff_applies_to_the_user() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Onix", 5)
                .with_moves(vec!["Harden"])
                .build(),
            TestPokemonBuilder::new("Charmander", 5)
                .with_moves(vec!["Splash"])
                .build(),
        );

        let events = play_turn(&mut state, 0);

        assert!(events.iter().any(|e| matches!(
            e,
            BattleEvent::Buffed { target, rounds: 1, .. } if target == "Onix"
        )));
        // One round: gone again at the end of the same turn
        assert!(events.contains(&BattleEvent::ModifiersExpired {
            target: "Onix".to_string(),
            count: 1,
        }));
        assert_eq!(state.players[0].team[0].effective_stats().defense, 160);
    }

    #[test]
    fn test_expiring_health_buff_clamps_current_hp() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Onix", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        );
        let onix = &mut state.players[0].team[0];
        onix.add_modifier(
            StatModifier {
                max_health: 5,
                ..StatModifier::default()
            },
            1,
        );
        onix.set_hp_to_max();
        assert_eq!(onix.current_hp(), 40);

        let mut bus = EventBus::new();
        execute_end_turn_phase(&mut state, &mut bus);

        assert_eq!(state.players[0].team[0].current_hp(), 35);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_heal_move_restores_the_user() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Squirtle", 5)
                .with_moves(vec!["Recover"])
                .with_hp(10)
                .build(),
            TestPokemonBuilder::new("Charmander", 5)
                .with_moves(vec!["Splash"])
                .build(),
        );

        let events = play_turn(&mut state, 0);

        assert!(events.contains(&BattleEvent::PokemonHealed {
            target: "Squirtle".to_string(),
            amount: 20,
            new_hp: 30,
        }));
    }

    #[test]
    fn test_health_debuff_clamps_before_a_heal_in_the_same_turn() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5)
                .with_moves(vec!["Shrink"])
                .build(),
            TestPokemonBuilder::new("Squirtle", 5)
                .with_moves(vec!["Recover"])
                .build(),
        );

        let events = play_turn(&mut state, 0);

        assert!(events.contains(&BattleEvent::PokemonHealed {
            target: "Squirtle".to_string(),
            amount: 0,
            new_hp: 34,
        }));
        let squirtle = &state.players[1].team[0];
        assert_eq!((squirtle.current_hp(), squirtle.max_hp()), (34, 34));
        assert_eq!(state.game_state, GameState::WaitingForActions);
    }

    #[test]
    fn test_debuff_to_zero_health_faints_and_rewards_the_attacker() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Onix", 8)
                .with_moves(vec!["Wither"])
                .build(),
            TestPokemonBuilder::new("Pikachu", 5)
                .with_moves(vec!["Splash"])
                .build(),
        );

        let events = play_turn(&mut state, 0);

        let fainted = events
            .iter()
            .position(|e| {
                *e == BattleEvent::PokemonFainted {
                    player_index: 1,
                    pokemon: "Pikachu".to_string(),
                }
            })
            .expect("the debuff should make Pikachu faint");
        let rewarded = events
            .iter()
            .position(|e| {
                *e == BattleEvent::ExperienceGained {
                    player_index: 0,
                    pokemon: "Onix".to_string(),
                    amount: 142,
                }
            })
            .expect("Onix should be rewarded for the knockout");
        assert!(fainted < rewarded);
        assert_eq!(state.players[1].team[0].current_hp(), 0);
        assert_eq!(state.game_state, GameState::Player1Win);
    }

    #[test]
    fn test_faint_from_expiring_buff_is_reported() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        );
        let pikachu = &mut state.players[0].team[0];
        pikachu.add_modifier(
            StatModifier {
                max_health: 50,
                ..StatModifier::default()
            },
            1,
        );
        pikachu.add_modifier(
            StatModifier {
                max_health: -60,
                ..StatModifier::default()
            },
            3,
        );
        assert_eq!(pikachu.current_hp(), 25);

        let mut bus = EventBus::new();
        execute_end_turn_phase(&mut state, &mut bus);

        assert!(state.players[0].team[0].is_fainted());
        assert_eq!(
            bus.events().last(),
            Some(&BattleEvent::PokemonFainted {
                player_index: 0,
                pokemon: "Pikachu".to_string(),
            })
        );
    }
}
