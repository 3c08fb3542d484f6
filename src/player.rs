use crate::pokemon::PokemonInst;
use schema::MAXIMUM_POKEMON_ROSTER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    // The index refers to the move's position (0-3) in the active Pokémon's move list.
    UseMove { move_index: usize },

    // The index refers to the Pokémon's position (0-5) in the trainer's roster.
    SwitchPokemon { team_index: usize },

    UseItem { item: String },

    Flee,
}

impl PlayerAction {
    pub fn is_switch(&self) -> bool {
        matches!(self, PlayerAction::SwitchPokemon { .. })
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::UseMove { move_index } => write!(f, "Use move #{}", move_index + 1),
            PlayerAction::SwitchPokemon { team_index } => {
                write!(f, "Switch to Pokemon #{}", team_index + 1)
            }
            PlayerAction::UseItem { item } => write!(f, "Use {}", item),
            PlayerAction::Flee => write!(f, "Flee"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trainer {
    pub name: String,

    // Ordered roster; the order is also the default switch-in order.
    pub team: Vec<PokemonInst>,

    // The index of the Pokémon in `team` that is currently active.
    pub active_pokemon_index: usize,

    // Item name -> count. Entries are removed when their count reaches zero.
    pub inventory: BTreeMap<String, u32>,
}

impl Trainer {
    pub fn new(name: impl Into<String>, team: Vec<PokemonInst>) -> Self {
        Trainer {
            name: name.into(),
            team,
            active_pokemon_index: 0,
            inventory: BTreeMap::new(),
        }
    }

    pub fn with_inventory(mut self, inventory: BTreeMap<String, u32>) -> Self {
        self.inventory = inventory;
        self.inventory.retain(|_, count| *count > 0);
        self
    }

    /// Get the currently active Pokemon
    pub fn active_pokemon(&self) -> Option<&PokemonInst> {
        self.team.get(self.active_pokemon_index)
    }

    /// Get the currently active Pokemon mutably
    pub fn active_pokemon_mut(&mut self) -> Option<&mut PokemonInst> {
        self.team.get_mut(self.active_pokemon_index)
    }

    pub fn active_is_fainted(&self) -> bool {
        self.active_pokemon().map_or(true, PokemonInst::is_fainted)
    }

    pub fn has_non_fainted_pokemon(&self) -> bool {
        self.team.iter().any(|pokemon| !pokemon.is_fainted())
    }

    pub fn first_non_fainted_index(&self) -> Option<usize> {
        self.team.iter().position(|pokemon| !pokemon.is_fainted())
    }

    /// Whether `team_index` names a Pokemon that could be switched in right now.
    pub fn can_switch_to(&self, team_index: usize) -> bool {
        team_index != self.active_pokemon_index
            && self
                .team
                .get(team_index)
                .is_some_and(|pokemon| !pokemon.is_fainted())
    }

    /// Switch the active Pokemon
    pub fn switch_pokemon(&mut self, new_index: usize) -> Result<(), String> {
        if new_index >= self.team.len() {
            return Err(format!("No Pokemon in team slot {}", new_index));
        }
        self.active_pokemon_index = new_index;
        Ok(())
    }

    pub fn item_count(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    /// Removes one of `item`. Returns false if there was none.
    pub fn consume_item(&mut self, item: &str) -> bool {
        match self.inventory.get_mut(item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.inventory.remove(item);
                }
                true
            }
            _ => false,
        }
    }

    pub fn add_item(&mut self, item: impl Into<String>, count: u32) {
        if count > 0 {
            *self.inventory.entry(item.into()).or_insert(0) += count;
        }
    }

    /// Get all valid move actions for this trainer's active Pokemon.
    pub fn get_valid_moves(&self) -> Vec<PlayerAction> {
        match self.active_pokemon() {
            Some(pokemon) if !pokemon.is_fainted() => pokemon
                .moves
                .iter()
                .enumerate()
                .filter(|(_, move_instance)| move_instance.is_usable())
                .map(|(move_index, _)| PlayerAction::UseMove { move_index })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get all valid switch actions for this trainer.
    pub fn get_valid_switches(&self) -> Vec<PlayerAction> {
        (0..self.team.len())
            .filter(|&team_index| self.can_switch_to(team_index))
            .map(|team_index| PlayerAction::SwitchPokemon { team_index })
            .collect()
    }

    /// A Pokemon can join while the roster has room and it is not already on it.
    pub fn can_add_pokemon(&self, pokemon: &PokemonInst) -> bool {
        self.team.len() < MAXIMUM_POKEMON_ROSTER && !self.team.contains(pokemon)
    }

    /// Appends `pokemon` to the roster, handing it back if it cannot join.
    pub fn add_pokemon(&mut self, pokemon: PokemonInst) -> Result<(), PokemonInst> {
        if !self.can_add_pokemon(&pokemon) {
            return Err(pokemon);
        }
        self.team.push(pokemon);
        Ok(())
    }

    /// Restores every Pokemon on the roster.
    pub fn rest(&mut self) {
        for pokemon in self.team.iter_mut() {
            pokemon.rest();
        }
    }
}
