use crate::battle::engine::{
    get_valid_actions, ready_for_turn_resolution, resolve_turn, validate_player_action,
};
use crate::battle::state::{BattleEvent, BattleState, BattleType, GameState, TurnRng};
use crate::config::BattleConfig;
use crate::errors::{BattleResult, InvalidActionError, InvalidRosterError};
use crate::player::{PlayerAction, Trainer};
use crate::pokemon::PokemonInst;
use crate::teams::create_trainer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use schema::{DataTable, ElementType, MAXIMUM_MOVE_SLOTS, MAXIMUM_POKEMON_ROSTER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// High-level battle interface: submit actions, resolve turns, query state.
///
/// Front ends (the terminal driver, tests, AI loops) only talk to the engine through this type.
#[derive(Debug)]
pub struct Battle {
    battle_state: BattleState,
    data: Arc<DataTable>,
    rng: StdRng,
    accumulated_events: Vec<BattleEvent>,
}

/// Read-only view of the whole battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn_number: u32,
    pub game_state: GameState,
    pub battle_type: BattleType,
    pub is_terminal: bool,
    pub winner: Option<usize>,
    pub winner_name: Option<String>,
    pub trainers: Vec<TrainerSnapshot>,
}

/// Status of one side of the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideStatus {
    Active,
    Fainted,    // Active Pokemon fainted, a replacement is available
    AllFainted, // Every Pokemon on the roster has fainted
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSnapshot {
    pub name: String,
    pub active_index: usize,
    pub status: SideStatus,
    pub team: Vec<PokemonSnapshot>,
    pub inventory: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSnapshot {
    pub name: String,
    pub species: String,
    pub element_type: ElementType,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub is_fainted: bool,
    pub moves: Vec<MoveSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSnapshot {
    pub name: String,
    pub uses: u8,
    pub max_uses: u8,
}

/// Result of resolving a turn or a replacement phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub events: Vec<BattleEvent>,
    pub messages: Vec<String>,
    pub new_state: GameState,
    pub battle_ended: bool,
    pub winner: Option<usize>,
}

impl From<&PokemonInst> for PokemonSnapshot {
    fn from(pokemon: &PokemonInst) -> Self {
        PokemonSnapshot {
            name: pokemon.name.clone(),
            species: pokemon.species.clone(),
            element_type: pokemon.element_type,
            level: pokemon.level,
            current_hp: pokemon.current_hp(),
            max_hp: pokemon.max_hp(),
            is_fainted: pokemon.is_fainted(),
            moves: pokemon
                .moves
                .iter()
                .map(|m| MoveSnapshot {
                    name: m.name.clone(),
                    uses: m.uses,
                    max_uses: m.max_uses,
                })
                .collect(),
        }
    }
}

impl From<&Trainer> for TrainerSnapshot {
    fn from(trainer: &Trainer) -> Self {
        let status = if !trainer.has_non_fainted_pokemon() {
            SideStatus::AllFainted
        } else if trainer.active_is_fainted() {
            SideStatus::Fainted
        } else {
            SideStatus::Active
        };

        TrainerSnapshot {
            name: trainer.name.clone(),
            active_index: trainer.active_pokemon_index,
            status,
            team: trainer.team.iter().map(PokemonSnapshot::from).collect(),
            inventory: trainer.inventory.clone(),
        }
    }
}

/// Checks a roster before battle and moves a fainted lead aside.
fn prepare_roster(trainer: &mut Trainer, data: &DataTable) -> Result<(), InvalidRosterError> {
    let label = if trainer.name.is_empty() {
        "The wild Pokemon".to_string()
    } else {
        trainer.name.clone()
    };

    if trainer.team.is_empty() {
        return Err(InvalidRosterError::Empty { trainer: label });
    }
    if trainer.team.len() > MAXIMUM_POKEMON_ROSTER {
        return Err(InvalidRosterError::TooLarge {
            trainer: label,
            size: trainer.team.len(),
            max: MAXIMUM_POKEMON_ROSTER,
        });
    }
    for pokemon in &trainer.team {
        if pokemon.moves.len() > MAXIMUM_MOVE_SLOTS {
            return Err(InvalidRosterError::TooManyMoves {
                pokemon: pokemon.name.clone(),
                count: pokemon.moves.len(),
                max: MAXIMUM_MOVE_SLOTS,
            });
        }
        if let Some(unknown) = pokemon
            .moves
            .iter()
            .find(|m| data.move_data(&m.name).is_none())
        {
            return Err(InvalidRosterError::UnknownMove {
                pokemon: pokemon.name.clone(),
                move_name: unknown.name.clone(),
            });
        }
    }

    match trainer.first_non_fainted_index() {
        None => Err(InvalidRosterError::AllFainted { trainer: label }),
        Some(first) => {
            if trainer.active_is_fainted() {
                trainer.active_pokemon_index = first;
            }
            Ok(())
        }
    }
}

impl Battle {
    /// Start a battle between two trainers.
    pub fn new(
        data: Arc<DataTable>,
        mut player1: Trainer,
        mut player2: Trainer,
        config: &BattleConfig,
    ) -> Result<Self, InvalidRosterError> {
        prepare_roster(&mut player1, &data)?;
        prepare_roster(&mut player2, &data)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        log::info!(
            "{} battle: {} vs {}",
            config.battle_type,
            player1.name,
            if player2.name.is_empty() {
                "a wild Pokemon"
            } else {
                &player2.name
            }
        );

        Ok(Self {
            battle_state: BattleState::new(player1, player2).with_battle_type(config.battle_type),
            data,
            rng,
            accumulated_events: Vec::new(),
        })
    }

    /// Start a trainer battle between two trainers listed in the data table.
    pub fn between(
        data: Arc<DataTable>,
        player1: &str,
        player2: &str,
        config: &BattleConfig,
    ) -> BattleResult<Self> {
        let player1 = create_trainer(&data, player1)?;
        let player2 = create_trainer(&data, player2)?;
        Ok(Self::new(data, player1, player2, config)?)
    }

    /// Start a wild battle. The opponent is a nameless trainer holding only `wild_pokemon`.
    pub fn encounter(
        data: Arc<DataTable>,
        trainer: Trainer,
        wild_pokemon: PokemonInst,
        config: &BattleConfig,
    ) -> Result<Self, InvalidRosterError> {
        let config = BattleConfig {
            battle_type: BattleType::Wild,
            ..config.clone()
        };
        Self::new(data, trainer, Trainer::new("", vec![wild_pokemon]), &config)
    }

    /// Queue an action for a player. Rejected actions leave the battle untouched.
    pub fn submit_action(
        &mut self,
        player_index: usize,
        action: PlayerAction,
    ) -> Result<(), InvalidActionError> {
        validate_player_action(&self.battle_state, &self.data, player_index, &action)?;
        log::debug!("Player {} submitted: {}", player_index, action);
        self.battle_state.queue_action(player_index, action);
        Ok(())
    }

    pub fn ready_for_turn_resolution(&self) -> bool {
        ready_for_turn_resolution(&self.battle_state)
    }

    /// Players that still owe an action before the battle can move on.
    pub fn players_needing_actions(&self) -> Vec<usize> {
        self.battle_state
            .game_state
            .players_to_act()
            .iter()
            .copied()
            .filter(|&index| self.battle_state.action_queue[index].is_none())
            .collect()
    }

    /// Resolve the next turn (or replacement phase) with randomness from the battle's own RNG.
    pub fn resolve_turn(&mut self) -> Result<TurnResult, InvalidActionError> {
        let rng = TurnRng::from_rng(&mut self.rng);
        self.resolve_turn_with_rng(rng)
    }

    /// Resolve the next turn using the given outcomes.
    pub fn resolve_turn_with_rng(&mut self, rng: TurnRng) -> Result<TurnResult, InvalidActionError> {
        if !self.ready_for_turn_resolution() {
            return Err(InvalidActionError::ActionsPending);
        }

        let event_bus = resolve_turn(&mut self.battle_state, &self.data, rng);
        let messages = event_bus.messages(&self.battle_state);
        let events = event_bus.into_events();
        self.accumulated_events.extend(events.iter().cloned());

        Ok(TurnResult {
            events,
            messages,
            new_state: self.battle_state.game_state,
            battle_ended: self.is_battle_ended(),
            winner: self.get_winner(),
        })
    }

    /// Every action `submit_action` would accept from this player right now.
    pub fn valid_actions(&self, player_index: usize) -> Vec<PlayerAction> {
        get_valid_actions(&self.battle_state, &self.data, player_index)
    }

    pub fn get_state(&self) -> BattleSnapshot {
        let winner = self.get_winner();
        BattleSnapshot {
            turn_number: self.battle_state.turn_number,
            game_state: self.battle_state.game_state,
            battle_type: self.battle_state.battle_type,
            is_terminal: self.is_battle_ended(),
            winner,
            winner_name: winner.map(|index| self.battle_state.players[index].name.clone()),
            trainers: self
                .battle_state
                .players
                .iter()
                .map(TrainerSnapshot::from)
                .collect(),
        }
    }

    pub fn is_battle_ended(&self) -> bool {
        self.battle_state.game_state.is_terminal()
    }

    pub fn get_winner(&self) -> Option<usize> {
        self.battle_state.game_state.winner()
    }

    pub fn battle_state(&self) -> &BattleState {
        &self.battle_state
    }

    pub fn data(&self) -> &DataTable {
        &self.data
    }

    /// Get all events that have occurred in the battle so far
    pub fn get_all_events(&self) -> &[BattleEvent] {
        &self.accumulated_events
    }

    /// Ends the battle and hands both trainers back.
    ///
    /// A caught wild Pokemon leaves the wild side and joins its catcher's roster.
    pub fn into_trainers(self) -> [Trainer; 2] {
        let mut players = self.battle_state.players;
        if let Some(catcher) = self.battle_state.captured_by {
            let wild_side = &mut players[1 - catcher];
            if wild_side.active_pokemon_index < wild_side.team.len() {
                let caught = wild_side.team.remove(wild_side.active_pokemon_index);
                wild_side.active_pokemon_index = 0;
                let name = caught.name.clone();
                match players[catcher].add_pokemon(caught) {
                    Ok(()) => log::info!("{} joins {}'s team", name, players[catcher].name),
                    Err(caught) => {
                        log::warn!("{} has no room for {}", players[catcher].name, name);
                        players[1 - catcher].team.insert(0, caught);
                    }
                }
            }
        }
        players
    }

    /// Mutable access to battle state for testing
    #[cfg(test)]
    pub fn battle_state_mut(&mut self) -> &mut BattleState {
        &mut self.battle_state
    }
}
