use crate::battle::commands::{BattleCommand, PlayerTarget};
use crate::battle::state::{ActionFailureReason, BattleEvent, BattleState, BattleType, TurnRng};
use crate::pokemon::experience_reward;
use schema::{DataTable, ItemData, MoveEffect, Target, MAXIMUM_POKEMON_ROSTER};

/// `floor(base * effectiveness * attack / (defense + 1))`, saturating at `u16::MAX`.
pub fn calculate_damage(base_damage: u16, effectiveness: f64, attack: u16, defense: u16) -> u16 {
    let damage = base_damage as f64 * effectiveness * attack as f64 / (defense as f64 + 1.0);
    damage.floor().clamp(0.0, u16::MAX as f64) as u16
}

fn fail(player_index: usize, reason: ActionFailureReason) -> Vec<BattleCommand> {
    vec![BattleCommand::EmitEvent(BattleEvent::ActionFailed {
        player_index,
        reason,
    })]
}

/// Calculate the outcome of `attacker_index` using the move in `move_index`.
///
/// Pure with respect to the battle state: the returned commands describe every change,
/// and only `rng` is advanced.
pub fn calculate_attack_outcome(
    state: &BattleState,
    data: &DataTable,
    attacker_index: usize,
    move_index: usize,
    rng: &mut TurnRng,
) -> Vec<BattleCommand> {
    let defender_index = 1 - attacker_index;
    let attacker_target = PlayerTarget::from_index(attacker_index);
    let defender_target = attacker_target.opponent();

    let attacker = match state.players[attacker_index].active_pokemon() {
        Some(pokemon) if !pokemon.is_fainted() => pokemon,
        _ => return fail(attacker_index, ActionFailureReason::PokemonFainted),
    };

    let move_instance = match attacker.get_move(move_index) {
        Some(instance) if instance.is_usable() => instance,
        _ => return fail(attacker_index, ActionFailureReason::NoUsesRemaining),
    };

    let move_data = match data.move_data(&move_instance.name) {
        Some(move_data) => move_data,
        None => {
            log::error!("Move {} is missing from the data table", move_instance.name);
            return fail(attacker_index, ActionFailureReason::NoUsesRemaining);
        }
    };

    let defender = state.players[defender_index]
        .active_pokemon()
        .filter(|pokemon| !pokemon.is_fainted());
    if move_data.effect.is_offensive() && defender.is_none() {
        return fail(attacker_index, ActionFailureReason::NoEnemyPresent);
    }

    let mut commands = vec![
        BattleCommand::UseMove {
            target: attacker_target,
            move_index,
        },
        BattleCommand::EmitEvent(BattleEvent::MoveUsed {
            player_index: attacker_index,
            pokemon: attacker.name.clone(),
            move_used: move_data.name.clone(),
        }),
    ];

    let attacker_stats = attacker.effective_stats();

    match &move_data.effect {
        MoveEffect::Damage { .. } | MoveEffect::FixedDamage { .. } => {
            // Offensive moves were checked above
            let Some(defender) = defender else {
                return commands;
            };
            let move_hit_chance = move_data.effect.hit_chance().unwrap_or(1.0);
            if !rng.roll(attacker_stats.hit_chance * move_hit_chance, "Move Hit Check") {
                commands.push(BattleCommand::EmitEvent(BattleEvent::MoveMissed {
                    attacker: attacker.name.clone(),
                    defender: defender.name.clone(),
                    move_used: move_data.name.clone(),
                }));
                return commands;
            }

            let damage = match move_data.effect {
                MoveEffect::Damage { base_damage, .. } => {
                    let effectiveness = move_data.element_type.effectiveness(defender.element_type);
                    commands.push(BattleCommand::EmitEvent(
                        BattleEvent::AttackTypeEffectiveness {
                            multiplier: effectiveness,
                        },
                    ));
                    calculate_damage(
                        base_damage,
                        effectiveness,
                        attacker_stats.attack,
                        defender.effective_stats().defense,
                    )
                }
                MoveEffect::FixedDamage { amount, .. } => amount,
                _ => 0,
            };

            commands.push(BattleCommand::DealDamage {
                target: defender_target,
                amount: damage,
            });

            if damage >= defender.current_hp() {
                commands.push(BattleCommand::AwardExperience {
                    target: attacker_target,
                    amount: experience_reward(defender.level),
                });
            }
        }
        MoveEffect::StatModifier {
            target,
            modifier,
            rounds,
        } => match (target, defender) {
            (Target::User, _) => {
                commands.push(BattleCommand::EmitEvent(BattleEvent::Buffed {
                    target: attacker.name.clone(),
                    modifier: *modifier,
                    rounds: *rounds,
                }));
                commands.push(BattleCommand::AddModifier {
                    target: attacker_target,
                    modifier: *modifier,
                    rounds: *rounds,
                });
            }
            (Target::Target, Some(defender)) => {
                commands.push(BattleCommand::EmitEvent(BattleEvent::Debuffed {
                    target: defender.name.clone(),
                    modifier: *modifier,
                    rounds: *rounds,
                }));
                commands.push(BattleCommand::AddModifier {
                    target: defender_target,
                    modifier: *modifier,
                    rounds: *rounds,
                });

                // A debuff that takes max health to zero counts as a knockout
                let mut debuffed = defender.clone();
                if debuffed.add_modifier(*modifier, *rounds) {
                    commands.push(BattleCommand::AwardExperience {
                        target: attacker_target,
                        amount: experience_reward(defender.level),
                    });
                }
            }
            (Target::Target, None) => {}
        },
        MoveEffect::Heal { amount } => {
            commands.push(BattleCommand::HealPokemon {
                target: attacker_target,
                amount: *amount,
            });
        }
        MoveEffect::NoEffect => {
            commands.push(BattleCommand::EmitEvent(BattleEvent::NothingHappened));
        }
    }

    commands
}

/// Calculate the outcome of `player_index` using one `item` from their inventory.
pub fn calculate_item_outcome(
    state: &BattleState,
    data: &DataTable,
    player_index: usize,
    item: &str,
    rng: &mut TurnRng,
) -> Vec<BattleCommand> {
    let player_target = PlayerTarget::from_index(player_index);
    let trainer = &state.players[player_index];

    if trainer.active_is_fainted() {
        return fail(player_index, ActionFailureReason::PokemonFainted);
    }
    let item_data = match data.item(item) {
        Some(item_data) if trainer.item_count(item) > 0 => item_data,
        _ => return fail(player_index, ActionFailureReason::NoItemRemaining),
    };

    let mut commands = vec![
        BattleCommand::ConsumeItem {
            target: player_target,
            item: item.to_string(),
        },
        BattleCommand::EmitEvent(BattleEvent::ItemUsed {
            player_index,
            item: item.to_string(),
        }),
    ];

    match item_data {
        ItemData::Food { health_restored } => {
            commands.push(BattleCommand::HealPokemon {
                target: player_target,
                amount: *health_restored,
            });
        }
        ItemData::Pokeball { catch_chance } => {
            commands.extend(calculate_catch_outcome(
                state,
                player_index,
                *catch_chance,
                rng,
            ));
        }
    }

    commands
}

/// Throwing a ball: only wild battles allow it, the roll comes before the roster check.
pub fn calculate_catch_outcome(
    state: &BattleState,
    player_index: usize,
    catch_chance: f64,
    rng: &mut TurnRng,
) -> Vec<BattleCommand> {
    if state.battle_type != BattleType::Wild {
        return vec![BattleCommand::EmitEvent(BattleEvent::CatchNotAllowed {
            player_index,
        })];
    }

    let wild_pokemon = match state.players[1 - player_index].active_pokemon() {
        Some(pokemon) if !pokemon.is_fainted() => pokemon,
        _ => return fail(player_index, ActionFailureReason::NoEnemyPresent),
    };

    if !rng.roll(catch_chance, "Catch Check") {
        return vec![BattleCommand::EmitEvent(BattleEvent::CatchFailed {
            pokemon: wild_pokemon.name.clone(),
        })];
    }

    if state.players[player_index].team.len() >= MAXIMUM_POKEMON_ROSTER {
        return vec![BattleCommand::EmitEvent(BattleEvent::TeamFull {
            player_index,
        })];
    }

    vec![
        BattleCommand::EmitEvent(BattleEvent::PokemonCaught {
            player_index,
            pokemon: wild_pokemon.name.clone(),
        }),
        BattleCommand::CapturePokemon {
            target: PlayerTarget::from_index(player_index),
        },
    ]
}

/// Running away works in wild battles and wastes the turn in trainer battles.
pub fn calculate_flee_outcome(state: &BattleState, player_index: usize) -> Vec<BattleCommand> {
    match state.battle_type {
        BattleType::Trainer => vec![BattleCommand::EmitEvent(BattleEvent::FleeFailed {
            player_index,
        })],
        BattleType::Wild => vec![
            BattleCommand::EmitEvent(BattleEvent::Escaped { player_index }),
            BattleCommand::SetGameState(crate::battle::state::GameState::Escaped),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, test_data, TestPokemonBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_damage_formula() {
        // floor(40 * 2.0 * 55 / 41) = floor(107.3)
        assert_eq!(calculate_damage(40, 2.0, 55, 40), 107);
        assert_eq!(calculate_damage(40, 0.0, 55, 40), 0);
        assert_eq!(calculate_damage(10, 1.0, 10, 0), 100);
    }

    #[test]
    fn test_miss_produces_no_damage() {
        let data = test_data();
        let state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        );
        // Thunder Shock has a 0.9 hit chance, so 91 misses
        let mut rng = TurnRng::new_for_test(vec![91]);

        let commands = calculate_attack_outcome(&state, &data, 0, 0, &mut rng);

        assert!(commands
            .iter()
            .any(|c| matches!(c, BattleCommand::EmitEvent(BattleEvent::MoveMissed { .. }))));
        assert!(!commands
            .iter()
            .any(|c| matches!(c, BattleCommand::DealDamage { .. })));
        assert_eq!(
            commands[0],
            BattleCommand::UseMove {
                target: PlayerTarget::Player1,
                move_index: 0
            }
        );
    }

    #[test]
    fn test_hit_uses_type_effectiveness() {
        let data = test_data();
        let state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Squirtle", 5).build(),
        );
        let mut rng = TurnRng::new_for_test(vec![1]);

        let commands = calculate_attack_outcome(&state, &data, 0, 0, &mut rng);

        // Electric on Water: floor(40 * 2.0 * 55 / (65 + 1)) = 66
        assert!(commands.contains(&BattleCommand::EmitEvent(
            BattleEvent::AttackTypeEffectiveness { multiplier: 2.0 }
        )));
        assert!(commands.contains(&BattleCommand::DealDamage {
            target: PlayerTarget::Player2,
            amount: 66,
        }));
    }

    #[test]
    fn test_debuff_targets_the_opponent() {
        let data = test_data();
        let state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        );
        let mut rng = TurnRng::new_for_test(vec![]);

        // Growl
        let commands = calculate_attack_outcome(&state, &data, 0, 1, &mut rng);

        assert!(commands.iter().any(|c| matches!(
            c,
            BattleCommand::AddModifier {
                target: PlayerTarget::Player2,
                rounds: 3,
                ..
            }
        )));
    }

    #[test]
    fn test_flee_depends_on_battle_type() {
        let mut state = create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        );
        assert_eq!(
            calculate_flee_outcome(&state, 0),
            vec![BattleCommand::EmitEvent(BattleEvent::FleeFailed {
                player_index: 0
            })]
        );

        state.battle_type = BattleType::Wild;
        assert!(calculate_flee_outcome(&state, 0)
            .contains(&BattleCommand::SetGameState(crate::battle::state::GameState::Escaped)));
    }
}
