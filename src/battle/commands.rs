use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState};
use crate::pokemon::PokemonInst;
use schema::StatModifier;
use thiserror::Error;

/// Player target for commands - provides type safety over raw indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTarget {
    Player1,
    Player2,
}

impl PlayerTarget {
    pub fn to_index(self) -> usize {
        match self {
            PlayerTarget::Player1 => 0,
            PlayerTarget::Player2 => 1,
        }
    }

    pub fn opponent(self) -> PlayerTarget {
        match self {
            PlayerTarget::Player1 => PlayerTarget::Player2,
            PlayerTarget::Player2 => PlayerTarget::Player1,
        }
    }

    /// Any index other than 0 is treated as the second player.
    pub fn from_index(index: usize) -> PlayerTarget {
        match index {
            0 => PlayerTarget::Player1,
            _ => PlayerTarget::Player2,
        }
    }
}

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetGameState(GameState),
    IncrementTurnNumber,
    ClearActionQueue,

    // Pokemon modifications
    DealDamage {
        target: PlayerTarget,
        amount: u16,
    },
    HealPokemon {
        target: PlayerTarget,
        amount: u16,
    },
    AddModifier {
        target: PlayerTarget,
        modifier: StatModifier,
        rounds: u8,
    },
    UseMove {
        target: PlayerTarget,
        move_index: usize,
    },
    AwardExperience {
        target: PlayerTarget,
        amount: u32,
    },

    // Trainer state changes
    SwitchPokemon {
        target: PlayerTarget,
        new_pokemon_index: usize,
    },
    ConsumeItem {
        target: PlayerTarget,
        item: String,
    },
    CapturePokemon {
        target: PlayerTarget,
    },

    // Battle flow
    EmitEvent(BattleEvent),
}

/// Error types for command execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no active Pokemon")]
    NoPokemon,
    #[error("invalid Pokemon index {0}")]
    InvalidPokemonIndex(usize),
    #[error("invalid move index {0}")]
    InvalidMove(usize),
    #[error("no {0} left to use")]
    MissingItem(String),
}

/// Execute a batch of commands in order, stopping at the first failure
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    for command in commands {
        execute_command(command, state, bus)?;
    }
    Ok(())
}

/// Helper function to execute commands that operate on the active Pokemon
fn execute_pokemon_command<F>(
    target: PlayerTarget,
    state: &mut BattleState,
    operation: F,
) -> Result<(), ExecutionError>
where
    F: FnOnce(&mut PokemonInst, usize) -> Result<(), ExecutionError>,
{
    let player_index = target.to_index();
    match state.players[player_index].active_pokemon_mut() {
        Some(pokemon) => operation(pokemon, player_index),
        None => Err(ExecutionError::NoPokemon),
    }
}

pub fn execute_command(
    command: BattleCommand,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    log::debug!("Executing {:?}", command);
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
            Ok(())
        }
        BattleCommand::DealDamage { target, amount } => {
            execute_pokemon_command(target, state, |pokemon, player_index| {
                let did_faint = pokemon.take_damage(amount);
                bus.push(BattleEvent::DamageDealt {
                    target: pokemon.name.clone(),
                    damage: amount,
                    remaining_hp: pokemon.current_hp(),
                });
                if did_faint {
                    bus.push(BattleEvent::PokemonFainted {
                        player_index,
                        pokemon: pokemon.name.clone(),
                    });
                }
                Ok(())
            })
        }
        BattleCommand::HealPokemon { target, amount } => {
            execute_pokemon_command(target, state, |pokemon, _| {
                let restored = pokemon.heal(amount);
                bus.push(BattleEvent::PokemonHealed {
                    target: pokemon.name.clone(),
                    amount: restored,
                    new_hp: pokemon.current_hp(),
                });
                Ok(())
            })
        }
        BattleCommand::AddModifier {
            target,
            modifier,
            rounds,
        } => execute_pokemon_command(target, state, |pokemon, player_index| {
            if pokemon.add_modifier(modifier, rounds) {
                bus.push(BattleEvent::PokemonFainted {
                    player_index,
                    pokemon: pokemon.name.clone(),
                });
            }
            Ok(())
        }),
        BattleCommand::UseMove { target, move_index } => {
            execute_pokemon_command(target, state, |pokemon, _| {
                if pokemon.use_move(move_index) {
                    Ok(())
                } else {
                    Err(ExecutionError::InvalidMove(move_index))
                }
            })
        }
        BattleCommand::AwardExperience { target, amount } => {
            execute_pokemon_command(target, state, |pokemon, player_index| {
                let gain = pokemon.gain_experience(amount);
                bus.push(BattleEvent::ExperienceGained {
                    player_index,
                    pokemon: pokemon.name.clone(),
                    amount,
                });
                for new_level in (gain.old_level + 1)..=gain.new_level {
                    bus.push(BattleEvent::LevelUp {
                        player_index,
                        pokemon: pokemon.name.clone(),
                        new_level,
                    });
                }
                Ok(())
            })
        }
        BattleCommand::SwitchPokemon {
            target,
            new_pokemon_index,
        } => {
            let player_index = target.to_index();
            let player = &mut state.players[player_index];
            let old_pokemon = player
                .active_pokemon()
                .map(|p| p.name.clone())
                .ok_or(ExecutionError::NoPokemon)?;
            let new_pokemon = player
                .team
                .get(new_pokemon_index)
                .map(|p| p.name.clone())
                .ok_or(ExecutionError::InvalidPokemonIndex(new_pokemon_index))?;
            player
                .switch_pokemon(new_pokemon_index)
                .map_err(|_| ExecutionError::InvalidPokemonIndex(new_pokemon_index))?;
            bus.push(BattleEvent::PokemonSwitched {
                player_index,
                old_pokemon,
                new_pokemon,
            });
            Ok(())
        }
        BattleCommand::ConsumeItem { target, item } => {
            if state.players[target.to_index()].consume_item(&item) {
                Ok(())
            } else {
                Err(ExecutionError::MissingItem(item))
            }
        }
        BattleCommand::CapturePokemon { target } => {
            state.captured_by = Some(target.to_index());
            state.game_state = GameState::Captured;
            Ok(())
        }
        BattleCommand::SetGameState(new_state) => {
            state.game_state = new_state;
            Ok(())
        }
        BattleCommand::IncrementTurnNumber => {
            state.turn_number += 1;
            Ok(())
        }
        BattleCommand::ClearActionQueue => {
            state.clear_action_queue();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestPokemonBuilder};
    use pretty_assertions::assert_eq;

    fn create_test_battle_state() -> BattleState {
        create_test_battle(
            TestPokemonBuilder::new("Pikachu", 5).build(),
            TestPokemonBuilder::new("Charmander", 5).build(),
        )
    }

    #[test]
    fn test_player_target_conversion() {
        assert_eq!(PlayerTarget::Player1.to_index(), 0);
        assert_eq!(PlayerTarget::Player2.to_index(), 1);
        assert_eq!(PlayerTarget::from_index(0), PlayerTarget::Player1);
        assert_eq!(PlayerTarget::from_index(1), PlayerTarget::Player2);
        assert_eq!(PlayerTarget::Player1.opponent(), PlayerTarget::Player2);
        assert_eq!(PlayerTarget::Player2.opponent(), PlayerTarget::Player1);
    }

    #[test]
    fn test_deal_damage_command() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();
        let initial_hp = state.players[0].active_pokemon().unwrap().current_hp();

        let result = execute_command_batch(
            vec![BattleCommand::DealDamage {
                target: PlayerTarget::Player1,
                amount: 20,
            }],
            &mut state,
            &mut bus,
        );

        assert!(result.is_ok());
        assert_eq!(
            state.players[0].active_pokemon().unwrap().current_hp(),
            initial_hp - 20
        );
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_fatal_damage_emits_faint() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();

        execute_command_batch(
            vec![BattleCommand::DealDamage {
                target: PlayerTarget::Player2,
                amount: 999,
            }],
            &mut state,
            &mut bus,
        )
        .unwrap();

        assert!(state.players[1].active_is_fainted());
        assert!(matches!(
            bus.events().last(),
            Some(BattleEvent::PokemonFainted { player_index: 1, .. })
        ));
    }

    #[test]
    fn test_heal_pokemon_command() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();

        execute_command_batch(
            vec![
                BattleCommand::DealDamage {
                    target: PlayerTarget::Player1,
                    amount: 30,
                },
                BattleCommand::HealPokemon {
                    target: PlayerTarget::Player1,
                    amount: 10,
                },
            ],
            &mut state,
            &mut bus,
        )
        .unwrap();

        let pokemon = state.players[0].active_pokemon().unwrap();
        assert_eq!(pokemon.current_hp(), pokemon.max_hp() - 20);
        assert!(matches!(
            bus.events().last(),
            Some(BattleEvent::PokemonHealed { amount: 10, .. })
        ));
    }

    #[test]
    fn test_use_move_without_uses_fails() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();
        state.players[0].team[0].moves[0].uses = 0;

        let result = execute_command(
            BattleCommand::UseMove {
                target: PlayerTarget::Player1,
                move_index: 0,
            },
            &mut state,
            &mut bus,
        );

        assert_eq!(result, Err(ExecutionError::InvalidMove(0)));
    }

    #[test]
    fn test_consume_missing_item_fails() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();

        let result = execute_command(
            BattleCommand::ConsumeItem {
                target: PlayerTarget::Player1,
                item: "Potion".to_string(),
            },
            &mut state,
            &mut bus,
        );

        assert_eq!(result, Err(ExecutionError::MissingItem("Potion".to_string())));
    }

    #[test]
    fn test_set_game_state_and_turn_commands() {
        let mut state = create_test_battle_state();
        let mut bus = EventBus::new();

        execute_command_batch(
            vec![
                BattleCommand::SetGameState(GameState::TurnInProgress),
                BattleCommand::IncrementTurnNumber,
            ],
            &mut state,
            &mut bus,
        )
        .unwrap();

        assert_eq!(state.game_state, GameState::TurnInProgress);
        assert_eq!(state.turn_number, 2);
        assert!(bus.is_empty());
    }
}
